//! Title-to-slug transform used to build detail-page links.

/// Build a URL slug from a book or article title.
///
/// Lowercases, folds Vietnamese diacritics to bare Latin letters, drops
/// everything else that is not alphanumeric, and hyphenates word breaks.
/// The transform is lossy but deterministic and idempotent; the reverse
/// lookup (slug to record) is the backend's job.
pub fn create_slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for ch in title.chars().flat_map(char::to_lowercase) {
        let ch = fold_vietnamese(ch);
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else if ch.is_whitespace() || ch == '-' {
            pending_hyphen = true;
        }
        // Any other character is dropped without forcing a word break.
    }

    out
}

/// Lowercase a title and fold diacritics without dropping anything.
///
/// Used as the collation key for A-Z / Z-A catalog sorting so that
/// Vietnamese titles order by their base letters.
pub(crate) fn fold_lower(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_vietnamese)
        .collect()
}

/// Map one lowercase Vietnamese letter-form to its base Latin letter.
/// Letters outside the fold table pass through unchanged.
fn fold_vietnamese(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ạ' | 'ả' | 'ã' | 'â' | 'ấ' | 'ầ' | 'ậ' | 'ẩ' | 'ẫ' | 'ă' | 'ắ' | 'ằ'
        | 'ặ' | 'ẳ' | 'ẵ' => 'a',
        'é' | 'è' | 'ẹ' | 'ẻ' | 'ẽ' | 'ê' | 'ế' | 'ề' | 'ệ' | 'ể' | 'ễ' => 'e',
        'í' | 'ì' | 'ị' | 'ỉ' | 'ĩ' => 'i',
        'ó' | 'ò' | 'ọ' | 'ỏ' | 'õ' | 'ô' | 'ố' | 'ồ' | 'ộ' | 'ổ' | 'ỗ' | 'ơ' | 'ớ' | 'ờ'
        | 'ợ' | 'ở' | 'ỡ' => 'o',
        'ú' | 'ù' | 'ụ' | 'ủ' | 'ũ' | 'ư' | 'ứ' | 'ừ' | 'ự' | 'ử' | 'ữ' => 'u',
        'ý' | 'ỳ' | 'ỵ' | 'ỷ' | 'ỹ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{create_slug, fold_lower};

    #[test]
    fn folds_vietnamese_title() {
        assert_eq!(
            create_slug("Tương Lai Sau Đại Dịch Covid"),
            "tuong-lai-sau-dai-dich-covid"
        );
    }

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(create_slug("Dế Mèn Phiêu Lưu Ký"), "de-men-phieu-luu-ky");
        assert_eq!(create_slug("Harry Potter 7"), "harry-potter-7");
    }

    #[test]
    fn strips_punctuation_without_breaking_words() {
        assert_eq!(create_slug("Đất rừng phương Nam!"), "dat-rung-phuong-nam");
        assert_eq!(create_slug("What's Next?"), "whats-next");
    }

    #[test]
    fn collapses_separator_runs() {
        assert_eq!(create_slug("a  -  b --- c"), "a-b-c");
        assert_eq!(create_slug("  spaced   out  "), "spaced-out");
    }

    #[test]
    fn trims_leading_and_trailing_hyphens() {
        assert_eq!(create_slug("--- Chào ---"), "chao");
        assert_eq!(create_slug("!!!"), "");
    }

    #[test]
    fn empty_input_yields_empty_slug() {
        assert_eq!(create_slug(""), "");
    }

    #[test]
    fn idempotent() {
        for title in [
            "Tương Lai Sau Đại Dịch Covid",
            "Sách GIÁO khoa (tập 1)",
            "already-a-slug",
            "",
            "100 năm cô đơn",
        ] {
            let once = create_slug(title);
            assert_eq!(create_slug(&once), once, "slug not stable for {title:?}");
        }
    }

    #[test]
    fn fold_lower_keeps_spacing() {
        assert_eq!(fold_lower("Đại Dịch"), "dai dich");
    }

    #[test]
    fn uppercase_diacritics_fold_too() {
        assert_eq!(create_slug("TƯƠNG LAI"), "tuong-lai");
    }
}
