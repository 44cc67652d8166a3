use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocaleMeta {
    pub code: &'static str,
    pub name: &'static str,
}

const LOCALE_META: &[LocaleMeta] = &[
    LocaleMeta {
        code: "en",
        name: "English",
    },
    LocaleMeta {
        code: "ru",
        name: "Русский",
    },
];

const LOCALE_TABLE: &[(&str, &str)] = &[
    ("en", include_str!("../i18n/en.json")),
    ("ru", include_str!("../i18n/ru.json")),
];

/// Supported locales with their native names.
#[must_use]
pub const fn locales() -> &'static [LocaleMeta] {
    LOCALE_META
}

fn load_translations(lang: &str) -> Option<Value> {
    let bundle = LOCALE_TABLE
        .iter()
        .find_map(|(code, data)| (*code == lang).then_some(*data))?;

    serde_json::from_str(bundle).ok()
}

/// Translations for one language with English as the fallback.
#[derive(Debug, Clone)]
pub struct I18nBundle {
    pub lang: String,
    translations: Value,
    fallback: Value,
}

impl I18nBundle {
    /// Bundle for `lang`, or English when the locale is unknown.
    #[must_use]
    pub fn new(lang: &str) -> Self {
        let fallback = load_translations("en").unwrap_or(Value::Object(serde_json::Map::new()));
        match load_translations(lang) {
            Some(translations) => Self {
                lang: lang.to_string(),
                translations,
                fallback,
            },
            None => {
                log::warn!("locale {lang:?} is not bundled; falling back to English");
                Self {
                    lang: "en".to_string(),
                    translations: fallback.clone(),
                    fallback,
                }
            }
        }
    }

    /// Whether the active language or the fallback defines `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        get_nested_value(&self.translations, key).is_some()
            || get_nested_value(&self.fallback, key).is_some()
    }

    fn resolve(&self, key: &str, args: Option<&BTreeMap<&str, &str>>) -> Option<String> {
        get_nested_value(&self.translations, key)
            .and_then(|v| render_value(v, &self.lang, args))
            .or_else(|| {
                get_nested_value(&self.fallback, key).and_then(|v| render_value(v, &self.lang, args))
            })
    }

    /// Translate a key
    ///
    /// Falls back to English, then to the key itself.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        self.tr(key, None)
    }

    /// Translate a key with variable substitution
    ///
    /// Variables in the translated string use the format {key} or {{key}}.
    #[must_use]
    pub fn tr(&self, key: &str, args: Option<&BTreeMap<&str, &str>>) -> String {
        self.resolve(key, args).unwrap_or_else(|| {
            log::debug!("missing translation for {key}");
            key.to_string()
        })
    }
}

impl Default for I18nBundle {
    fn default() -> Self {
        Self::new("en")
    }
}

fn get_nested_value<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    let keys: Vec<&str> = key.split('.').collect();
    let mut current = obj;

    for k in keys {
        match current.get(k) {
            Some(value) => current = value,
            None => return None,
        }
    }
    Some(current)
}

fn plural_category(lang: &str, count: f64) -> String {
    if count.fract().abs() > f64::EPSILON {
        return "other".to_string();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = count.abs() as u64;
    match lang {
        "ru" => {
            let (rem10, rem100) = (n % 10, n % 100);
            if rem10 == 1 && rem100 != 11 {
                "one".to_string()
            } else if (2..=4).contains(&rem10) && !(12..=14).contains(&rem100) {
                "few".to_string()
            } else {
                "many".to_string()
            }
        }
        _ => {
            if n == 1 {
                "one".to_string()
            } else if n == 0 {
                "zero".to_string()
            } else {
                "other".to_string()
            }
        }
    }
}

fn render_value(value: &Value, lang: &str, args: Option<&BTreeMap<&str, &str>>) -> Option<String> {
    let mut text = match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            // Prefer plural categories if count provided
            if let Some(count_str) = args.and_then(|m| m.get("count")).copied() {
                if let Ok(count) = count_str.parse::<f64>() {
                    let category = plural_category(lang, count);
                    if let Some(s) = map.get(&category).and_then(Value::as_str) {
                        s.to_string()
                    } else if let Some(default) = map.get("_").and_then(Value::as_str) {
                        default.to_string()
                    } else {
                        return None;
                    }
                } else {
                    map.get("_")
                        .and_then(Value::as_str)
                        .map(std::string::ToString::to_string)?
                }
            } else if let Some(default) = map.get("_").and_then(Value::as_str) {
                default.to_string()
            } else {
                return None;
            }
        }
        _ => return None,
    };

    if let Some(args_map) = args {
        for (k, v) in args_map {
            let ph1 = format!("{{{{{k}}}}}");
            let ph2 = format!("{{{k}}}");
            text = text.replace(&ph1, v);
            text = text.replace(&ph2, v);
        }
    }
    Some(text)
}
