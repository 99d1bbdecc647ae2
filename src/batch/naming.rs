//! # Output Naming Module
//!
//! Centralizza il calcolo dei nomi dei file prodotti.
//! Il nome include sempre l'indice del task nel batch: due upload con lo
//! stesso nome (`clip.avi`) non possono sovrascriversi a vicenda.

/// Derives artifact names for converted files
pub struct OutputNaming;

impl OutputNaming {
    /// `<stem>-<sequence_index>.<extension>`, unique within one batch
    pub fn output_name(source_name: &str, sequence_index: usize, extension: &str) -> String {
        format!("{}-{}.{}", Self::sanitized_stem(source_name), sequence_index, extension)
    }

    /// Extension of the source name, if any (used for the staged input)
    pub fn source_extension(source_name: &str) -> Option<String> {
        let base = Self::base_name(source_name);
        let (stem, ext) = base.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>())
            .filter(|ext| !ext.is_empty())
    }

    fn base_name(source_name: &str) -> &str {
        source_name.rsplit(['/', '\\']).next().unwrap_or(source_name)
    }

    /// File stem of the source with path components and control characters removed
    fn sanitized_stem(source_name: &str) -> String {
        let base = Self::base_name(source_name);
        let stem = match base.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => base,
        };

        let cleaned: String = stem
            .chars()
            .map(|c| if c.is_control() || c == ':' { '_' } else { c })
            .collect();
        let cleaned = cleaned.trim();

        if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
            "output".to_string()
        } else {
            cleaned.to_string()
        }
    }
}
