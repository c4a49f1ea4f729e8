//! Display names and output file names derived from product identifiers.

use serde::{Deserialize, Serialize};

/// Characters that cannot appear in file names on common filesystems.
const ILLEGAL_FILE_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replace illegal file-name characters with `_`, collapse line breaks into
/// single spaces, and trim.
pub fn clean_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_break = false;
    for ch in raw.chars() {
        if ch == '\r' || ch == '\n' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
            continue;
        }
        in_break = false;
        if ILLEGAL_FILE_CHARS.contains(&ch) {
            out.push('_');
        } else {
            out.push(ch);
        }
    }
    out.trim().to_string()
}

/// Trimmed `"{chinese} {english}"` of the cleaned names.
pub fn display_name(chinese_name: &str, english_name: &str) -> String {
    format!("{} {}", clean_name(chinese_name), clean_name(english_name))
        .trim()
        .to_string()
}

/// `{customer}+{theme}+盒标.pdf`
pub fn box_label_file_name(customer: &str, theme: &str) -> String {
    format!("{}+{}+盒标.pdf", clean_name(customer), clean_name(theme))
}

/// `{customer}+{theme}+箱标.pdf`
pub fn case_label_file_name(customer: &str, theme: &str) -> String {
    format!("{}+{}+箱标.pdf", clean_name(customer), clean_name(theme))
}

/// `外箱汇总-{product_code}-{english_name}.xlsx`
pub fn summary_file_name(product_code: &str, english_name: &str) -> String {
    format!(
        "外箱汇总-{}-{}.xlsx",
        clean_name(product_code),
        clean_name(english_name)
    )
}

/// Identifiers of the product a job prints for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductNames {
    #[serde(default)]
    pub customer: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub chinese_name: String,
    #[serde(default)]
    pub english_name: String,
    #[serde(default)]
    pub product_code: String,
}

impl ProductNames {
    pub fn display_name(&self) -> String {
        display_name(&self.chinese_name, &self.english_name)
    }

    pub fn box_label_file_name(&self) -> String {
        box_label_file_name(&self.customer, &self.theme)
    }

    pub fn case_label_file_name(&self) -> String {
        case_label_file_name(&self.customer, &self.theme)
    }

    pub fn summary_file_name(&self) -> String {
        summary_file_name(&self.product_code, &self.english_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clean_replaces_illegal_characters() {
        assert_eq!(clean_name("a/b:c*d?\"e<f>g|h\\i"), "a_b_c_d__e_f_g_h_i");
    }

    #[test]
    fn clean_collapses_line_breaks() {
        assert_eq!(clean_name("  Spring\r\nGarden\n\nSet  "), "Spring Garden Set");
    }

    #[test]
    fn display_name_trims_missing_halves() {
        assert_eq!(display_name("春日", "Spring Tarot"), "春日 Spring Tarot");
        assert_eq!(display_name("", "Spring Tarot"), "Spring Tarot");
        assert_eq!(display_name("春日\n", "  "), "春日");
    }

    #[test]
    fn file_names_follow_filing_convention() {
        let names = ProductNames {
            customer: "ACME".into(),
            theme: "Moon/Sun".into(),
            chinese_name: "月".into(),
            english_name: "Moon: Deck".into(),
            product_code: "P-01".into(),
        };
        assert_eq!(names.box_label_file_name(), "ACME+Moon_Sun+盒标.pdf");
        assert_eq!(names.case_label_file_name(), "ACME+Moon_Sun+箱标.pdf");
        assert_eq!(names.summary_file_name(), "外箱汇总-P-01-Moon_ Deck.xlsx");
    }
}
