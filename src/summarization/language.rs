//! English display names for ISO 639-1 language codes.

/// Code used when the caller does not ask for a translation.
pub const DEFAULT_LANGUAGE: &str = "en";

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("af", "Afrikaans"),
    ("ar", "Arabic"),
    ("bg", "Bulgarian"),
    ("bn", "Bangla"),
    ("ca", "Catalan"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("et", "Estonian"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fil", "Filipino"),
    ("fr", "French"),
    ("ga", "Irish"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hr", "Croatian"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("is", "Icelandic"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("lt", "Lithuanian"),
    ("lv", "Latvian"),
    ("ms", "Malay"),
    ("nb", "Norwegian Bokmål"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sr", "Serbian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

/// Regional variants named differently from their base language. Keys are lower-case with `-`.
const REGIONAL_NAMES: &[(&str, &str)] = &[
    ("de-at", "Austrian German"),
    ("de-ch", "Swiss High German"),
    ("en-au", "Australian English"),
    ("en-ca", "Canadian English"),
    ("en-gb", "British English"),
    ("en-us", "American English"),
    ("es-419", "Latin American Spanish"),
    ("es-es", "European Spanish"),
    ("es-mx", "Mexican Spanish"),
    ("fr-ca", "Canadian French"),
    ("fr-ch", "Swiss French"),
    ("nl-be", "Flemish"),
    ("pt-br", "Brazilian Portuguese"),
    ("pt-pt", "European Portuguese"),
    ("zh-hans", "Simplified Chinese"),
    ("zh-hant", "Traditional Chinese"),
];

/// Human-readable English name for a language tag.
///
/// Known regional tags (`pt-BR`, `en_GB`) get their regional name; otherwise the primary subtag
/// decides. Unknown codes are returned unchanged so the directive still names something.
pub fn display_name(code: &str) -> String {
    let code = code.trim();
    let tag = code.replace('_', "-").to_ascii_lowercase();
    let primary = tag.split('-').next().unwrap_or_default();

    lookup(REGIONAL_NAMES, &tag)
        .or_else(|| lookup(LANGUAGE_NAMES, primary))
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(candidate, _)| *candidate == key)
        .map(|(_, name)| *name)
}

/// Whether `code` asks for the default language, which needs no translation directive.
pub fn is_default(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case(DEFAULT_LANGUAGE)
}
