//! Text normalization shared by the search blob, profile keywords, pairing tags
//! and the semantic table: lowercase + diacritic folding + whitespace collapse,
//! so "Albariño " and "albarino" compare equal.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Lowercase, strip accents from Latin letters, collapse whitespace, trim.
pub fn normalize_text(s: &str) -> String {
    let folded: String = s.chars().flat_map(char::to_lowercase).map(fold_char).collect();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(&folded, " ").trim().to_string()
}

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_spanish_accents() {
        assert_eq!(normalize_text("Albariño"), "albarino");
        assert_eq!(normalize_text("Mencía"), "mencia");
        assert_eq!(normalize_text("AROMÁTICO"), "aromatico");
        assert_eq!(normalize_text("Rosé"), "rose");
    }

    #[test]
    fn plain_ascii_is_just_lowercased() {
        assert_eq!(normalize_text("Rioja Crianza 2019"), "rioja crianza 2019");
    }

    #[test]
    fn collapses_ws_and_trims() {
        assert_eq!(normalize_text("  Quesos \t curados\n"), "quesos curados");
        assert_eq!(normalize_text("   "), "");
    }
}
