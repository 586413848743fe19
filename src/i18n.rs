// i18n.rs - runtime string tables for the demo window
//
// Strings live in assets/i18n/<lang>.json (flat `{ "key": "value" }`).
// Lookup order is the selected language, then English, then the key itself.
//
// Language selection: `--lang <code>`, then STATS_LANG, then "en".

use once_cell::sync::OnceCell;
use std::{collections::HashMap, path::PathBuf, sync::RwLock};

pub const FALLBACK_LANG: &str = "en";

pub const LANGUAGES: [(&str, &str); 3] = [("en", "English"), ("zh-Hans", "简体中文"), ("ja", "日本語")];

#[derive(Debug, Clone, Default)]
struct I18n {
    map: HashMap<String, String>,
    fallback_map: HashMap<String, String>,
}

static I18N: OnceCell<RwLock<I18n>> = OnceCell::new();

/// `<exe_dir>/assets/i18n/<lang>.json` first, then `./assets/i18n/<lang>.json`.
fn find_lang_file(lang: &str) -> Option<PathBuf> {
    let file = format!("{lang}.json");
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.to_path_buf()));

    exe_dir
        .into_iter()
        .chain(std::iter::once(PathBuf::new()))
        .map(|dir| dir.join("assets").join("i18n").join(&file))
        .find(|p| p.exists())
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    let Some(path) = find_lang_file(lang) else {
        log::warn!("no string table for language {lang}");
        return HashMap::new();
    };
    statistics_scene::config::load_json_or_default(&path)
}

/// Safe to call again; a later call swaps the active tables.
pub fn init(lang: &str) {
    let map = load_lang(lang);
    let fallback_map = if lang == FALLBACK_LANG {
        map.clone()
    } else {
        load_lang(FALLBACK_LANG)
    };
    let tables = I18n { map, fallback_map };

    match I18N.get() {
        Some(lock) => {
            if let Ok(mut w) = lock.write() {
                *w = tables;
            }
        }
        None => {
            let _ = I18N.set(RwLock::new(tables));
        }
    }
}

pub fn tr(key: &str) -> String {
    let Some(i) = I18N.get().and_then(|l| l.read().ok()) else {
        return key.to_string();
    };
    i.map
        .get(key)
        .or_else(|| i.fallback_map.get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// `{name}` placeholders not listed in `args` are left as they are.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    args.iter().fold(tr(key), |s, (k, v)| s.replace(&format!("{{{k}}}"), v))
}

pub fn resolve_lang_from_args() -> String {
    let mut it = std::env::args();
    while let Some(a) = it.next() {
        if a == "--lang" {
            if let Some(v) = it.next() {
                return v;
            }
        }
    }

    if let Ok(v) = std::env::var("STATS_LANG") {
        if !v.trim().is_empty() {
            return v;
        }
    }

    FALLBACK_LANG.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_falls_back_to_itself() {
        assert_eq!(tr("no.such.key"), "no.such.key");
    }

    #[test]
    fn placeholders_are_substituted() {
        let s = tr_with("{page} of {count} ({other})", &[("page", "2".into()), ("count", "4".into())]);
        assert_eq!(s, "2 of 4 ({other})");
    }
}
