//! Server-side rendering: the template environment, display filters and flash messages.

use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use minijinja::{context, Environment, Value};
use serde::{Serialize, Serializer};
use time::{format_description::FormatItem, macros::format_description, OffsetDateTime, Time};

use crate::{auth::extractors::CurrentUser, error::AppResult};

const FLASH_COOKIE: &str = "gardenflow_flash";

const DATETIME_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");
const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[day].[month].[year]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

macro_rules! templates {
    ($($name:literal),* $(,)?) => {
        &[$(($name, include_str!(concat!("../templates/", $name)))),*]
    };
}

const TEMPLATES: &[(&str, &str)] = templates![
    "base.html",
    "home.html",
    "register.html",
    "login.html",
    "profile.html",
    "dashboard.html",
    "zone_form.html",
    "zone_confirm_delete.html",
    "schedule_form.html",
    "schedule_confirm_delete.html",
    "start_watering.html",
    "watering_history.html",
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_filter("multiply", multiply);
        env.add_filter("divide", divide);
        env.add_filter("get_item", get_item);
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }
}

// --- filters ---

fn as_number(v: &Value) -> Option<f64> {
    if let Some(s) = v.as_str() {
        return s.trim().parse::<f64>().ok();
    }
    if v.is_undefined() || v.is_none() {
        return None;
    }
    f64::try_from(v.clone()).ok()
}

/// `{{ value|multiply(arg) }}`; anything non-numeric renders as 0.
pub fn multiply(value: Value, arg: Value) -> f64 {
    match (as_number(&value), as_number(&arg)) {
        (Some(a), Some(b)) => a * b,
        _ => 0.0,
    }
}

/// `{{ value|divide(arg) }}`; non-numeric input or a zero divisor renders as 0.
pub fn divide(value: Value, arg: Value) -> f64 {
    match (as_number(&value), as_number(&arg)) {
        (Some(a), Some(b)) if b != 0.0 => a / b,
        _ => 0.0,
    }
}

/// `{{ mapping|get_item(key) }}`
pub fn get_item(mapping: Value, key: Value) -> Value {
    if mapping.is_none() || mapping.is_undefined() {
        return Value::from(());
    }
    match mapping.get_item(&key) {
        Ok(v) if !v.is_undefined() => v,
        _ => Value::from(()),
    }
}

// --- flash messages ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Error => "error",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(FlashLevel::Success),
            "info" => Some(FlashLevel::Info),
            "error" => Some(FlashLevel::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub text: String,
}

/// Queue a one-shot message for the next rendered page.
pub fn flash(jar: CookieJar, level: FlashLevel, text: impl Into<String>) -> CookieJar {
    let value = format!("{}:{}", level.as_str(), text.into());
    let cookie = Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Pop the pending message, if any.
pub fn take_flash(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let parsed = cookie.value().split_once(':').and_then(|(level, text)| {
        FlashLevel::parse(level).map(|level| Flash {
            level,
            text: text.to_string(),
        })
    });
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, parsed)
}

// --- page rendering ---

/// Render `name` inside the site layout. Every page sees `current_user` and `flash`.
pub fn page<S: Serialize>(
    templates: &Templates,
    jar: CookieJar,
    user: Option<&CurrentUser>,
    name: &str,
    ctx: S,
) -> AppResult<Response> {
    let (jar, flash) = take_flash(jar);
    let ctx = Value::from_serialize(&ctx);
    let html = templates.render(
        name,
        context! {
            current_user => user,
            flash => flash,
            ..ctx
        },
    )?;
    Ok((jar, Html(html)).into_response())
}

// --- display serializers for template view models ---

pub fn display_datetime<S: Serializer>(dt: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
    let text = dt
        .format(DATETIME_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

pub fn display_date<S: Serializer>(dt: &OffsetDateTime, s: S) -> Result<S::Ok, S::Error> {
    let text = dt.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

pub fn display_time<S: Serializer>(t: &Time, s: S) -> Result<S::Ok, S::Error> {
    let text = t.format(TIME_FORMAT).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}

pub fn display_datetime_opt<S: Serializer>(
    dt: &Option<OffsetDateTime>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => display_datetime(dt, s),
        None => s.serialize_none(),
    }
}
