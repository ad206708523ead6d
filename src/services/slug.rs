const MAX_SLUG_LEN: usize = 100;
const FALLBACK_SLUG: &str = "untitled";

/// Derive a URL-safe identifier from a display name.
///
/// Lowercases the input, collapses runs of whitespace and underscores into a
/// single hyphen, drops everything that is not ASCII alphanumeric, a hyphen,
/// or a Thai letter (U+0E00..=U+0E7F), trims hyphens at both ends and caps the
/// result at 100 characters. An input that reduces to nothing becomes
/// "untitled". Applying the function to its own output returns it unchanged.
pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len().min(MAX_SLUG_LEN));
    let mut pending_hyphen = false;

    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            if !slug.is_empty() {
                pending_hyphen = true;
            }
            continue;
        }
        if !is_slug_char(ch) {
            continue;
        }
        if pending_hyphen {
            if slug.chars().count() + 1 >= MAX_SLUG_LEN {
                break;
            }
            slug.push('-');
            pending_hyphen = false;
        }
        if slug.chars().count() >= MAX_SLUG_LEN {
            break;
        }
        slug.push(ch);
    }

    if slug.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    slug
}

fn is_slug_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || is_thai(ch)
}

fn is_thai(ch: char) -> bool {
    ('\u{0E00}'..='\u{0E7F}').contains(&ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_collapses_spaces() {
        assert_eq!(slugify("My Course!!"), "my-course");
        assert_eq!(slugify("  Hello,   World  "), "hello-world");
        assert_eq!(slugify("snake_case_name"), "snake-case-name");
    }

    #[test]
    fn lowercases_input() {
        assert_eq!(slugify("Rust For BACKEND Engineers"), "rust-for-backend-engineers");
    }

    #[test]
    fn keeps_thai_letters() {
        assert_eq!(slugify("คอร์สเรียน Rust"), "คอร์สเรียน-rust");
    }

    #[test]
    fn falls_back_to_untitled() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!!???"), "untitled");
        assert_eq!(slugify("   "), "untitled");
    }

    #[test]
    fn trims_leading_and_trailing_hyphens() {
        assert_eq!(slugify("--edge case--"), "edge-case");
        assert_eq!(slugify("_leading underscore"), "leading-underscore");
    }

    #[test]
    fn truncates_to_100_chars() {
        let long = "a".repeat(500);
        let slug = slugify(&long);
        assert_eq!(slug.chars().count(), 100);
    }

    #[test]
    fn truncation_never_leaves_trailing_hyphen() {
        // 99 chars then a word boundary right at the cap
        let input = format!("{} tail", "a".repeat(99));
        let slug = slugify(&input);
        assert!(!slug.ends_with('-'), "slug: {slug}");
        assert_eq!(slugify(&slug), slug);
    }

    #[test]
    fn idempotent_on_sampled_inputs() {
        let samples = [
            "My Course!!",
            "Déjà vu lessons",
            "คอร์สเรียนภาษาไทย",
            "a_b_c d-e",
            "123 ___ 456",
            "ALL CAPS TITLE",
            "emoji 🎓 course",
            "--x--",
        ];
        for sample in samples {
            let once = slugify(sample);
            assert_eq!(slugify(&once), once, "input: {sample}");
            assert!(!once.is_empty());
        }
    }

    #[test]
    fn output_charset_is_closed() {
        let samples = ["Ünïcödé Nämé", "русский текст", "中文课程", "mixed ไทย text!"];
        for sample in samples {
            for ch in slugify(sample).chars() {
                assert!(
                    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' || is_thai(ch),
                    "unexpected char {ch:?} for input {sample}"
                );
            }
        }
    }
}
