//! Tesseract recognizer.
//!
//! Runs `tesseract <image> stdout -l <langs> tsv` and rebuilds text lines
//! from the word rows. The page row supplies the image height, the line rows
//! supply the line boxes.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use super::backend::{OcrError, RecognizerConfig, RecognizerType, TextRecognizer};
use super::model_utils::check_binary;
use crate::inference::TextFragment;

const TSV_COLUMNS: usize = 12;
const LEVEL_PAGE: u32 = 1;
const LEVEL_LINE: u32 = 4;
const LEVEL_WORD: u32 = 5;

/// Tesseract OCR recognizer.
pub struct TesseractRecognizer {
    config: RecognizerConfig,
}

impl TesseractRecognizer {
    /// Create a new Tesseract recognizer with default configuration.
    pub fn new() -> Self {
        Self {
            config: RecognizerConfig::default(),
        }
    }

    /// Create a new Tesseract recognizer with custom configuration.
    pub fn with_config(config: RecognizerConfig) -> Self {
        Self { config }
    }

    fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.tesseract_languages()])
            .arg("tsv")
            .output();

        match output {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(OcrError::OcrFailed(format!("tesseract failed: {}", stderr)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(OcrError::BackendNotAvailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ))
            }
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognizer_type(&self) -> RecognizerType {
        RecognizerType::Tesseract
    }

    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if check_binary("tesseract") {
            "Tesseract is available".to_string()
        } else {
            "Tesseract not installed. Install with: apt install tesseract-ocr tesseract-ocr-jpn"
                .to_string()
        }
    }

    fn recognize(&self, image_path: &Path) -> Result<Vec<TextFragment>, OcrError> {
        let start = Instant::now();
        let tsv = self.run_tesseract(image_path)?;
        let fragments = parse_tsv(&tsv)?;
        tracing::debug!(
            "tesseract recognized {} lines in {} in {}ms",
            fragments.len(),
            image_path.display(),
            start.elapsed().as_millis()
        );
        Ok(fragments)
    }
}

#[derive(Default)]
struct LineAccumulator {
    height: u32,
    words: Vec<String>,
}

/// Parse Tesseract TSV output into line fragments in reading order.
pub fn parse_tsv(tsv: &str) -> Result<Vec<TextFragment>, OcrError> {
    let mut page_height: Option<u32> = None;
    // (block, paragraph, line) keeps reading order.
    let mut lines: BTreeMap<(u32, u32, u32), LineAccumulator> = BTreeMap::new();

    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 && row.starts_with("level") {
            continue;
        }
        if row.trim().is_empty() {
            continue;
        }

        let cols: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
        if cols.len() < TSV_COLUMNS - 1 {
            return Err(OcrError::MalformedOutput(format!(
                "expected {} columns on line {}, found {}",
                TSV_COLUMNS,
                idx + 1,
                cols.len()
            )));
        }

        let num = |i: usize| -> Result<u32, OcrError> {
            cols[i].trim().parse::<u32>().map_err(|_| {
                OcrError::MalformedOutput(format!(
                    "non-numeric column {} on line {}: {:?}",
                    i + 1,
                    idx + 1,
                    cols[i]
                ))
            })
        };

        let level = num(0)?;
        let key = (num(2)?, num(3)?, num(4)?);
        let height = num(9)?;

        match level {
            LEVEL_PAGE => page_height = Some(height),
            LEVEL_LINE => lines.entry(key).or_default().height = height,
            LEVEL_WORD => {
                let text = cols.get(11).map(|t| t.trim()).unwrap_or("");
                if !text.is_empty() {
                    lines.entry(key).or_default().words.push(text.to_string());
                }
            }
            _ => {}
        }
    }

    let page_height = page_height
        .ok_or_else(|| OcrError::MalformedOutput("missing page row".to_string()))?;

    Ok(lines
        .into_values()
        .filter(|line| !line.words.is_empty())
        .map(|line| TextFragment::from_pixels(join_words(&line.words), line.height, page_height))
        .collect())
}

/// Join recognized words, omitting spaces between characters of scripts
/// that are written without them.
fn join_words(words: &[String]) -> String {
    let mut text = String::new();
    for word in words {
        let needs_space = match (text.chars().next_back(), word.chars().next()) {
            (Some(prev), Some(next)) => !(is_spaceless_script_char(prev) || is_spaceless_script_char(next)),
            _ => false,
        };
        if needs_space {
            text.push(' ');
        }
        text.push_str(word);
    }
    text
}

fn is_spaceless_script_char(c: char) -> bool {
    matches!(
        c as u32,
        // CJK Unified Ideographs
        0x4E00..=0x9FFF
        // CJK Unified Ideographs Extension A
        | 0x3400..=0x4DBF
        // Hiragana
        | 0x3040..=0x309F
        // Katakana
        | 0x30A0..=0x30FF
        // CJK Symbols and Punctuation
        | 0x3000..=0x303F
        // Fullwidth Forms
        | 0xFF00..=0xFFEF
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut s = String::from(HEADER);
        for row in rows {
            s.push('\n');
            s.push_str(row);
        }
        s
    }

    #[test]
    fn test_parse_lines_with_relative_heights() {
        let output = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t1000\t2000\t-1\t",
            "2\t1\t1\t0\t0\t0\t10\t10\t900\t300\t-1\t",
            "3\t1\t1\t1\t0\t0\t10\t10\t900\t300\t-1\t",
            "4\t1\t1\t1\t1\t0\t10\t10\t900\t200\t-1\t",
            "5\t1\t1\t1\t1\t1\t10\t10\t100\t200\t95.1\tField",
            "5\t1\t1\t1\t1\t2\t120\t10\t100\t200\t94.0\tTrip",
            "4\t1\t1\t1\t2\t0\t10\t250\t900\t40\t-1\t",
            "5\t1\t1\t1\t2\t1\t10\t250\t100\t40\t90.0\tBring",
            "5\t1\t1\t1\t2\t2\t120\t250\t100\t40\t90.0\tlunch",
        ]);
        let fragments = parse_tsv(&output).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "Field Trip");
        assert_eq!(fragments[0].relative_height, 0.1);
        assert_eq!(fragments[1].text, "Bring lunch");
        assert_eq!(fragments[1].relative_height, 0.02);
    }

    #[test]
    fn test_japanese_words_joined_without_spaces() {
        let output = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t1000\t1000\t-1\t",
            "4\t1\t1\t1\t1\t0\t0\t0\t500\t50\t-1\t",
            "5\t1\t1\t1\t1\t1\t0\t0\t50\t50\t90\t運動会",
            "5\t1\t1\t1\t1\t2\t0\t0\t50\t50\t90\tの",
            "5\t1\t1\t1\t1\t3\t0\t0\t50\t50\t90\tお知らせ",
        ]);
        let fragments = parse_tsv(&output).unwrap();
        assert_eq!(fragments[0].text, "運動会のお知らせ");
    }

    #[test]
    fn test_empty_lines_dropped() {
        let output = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t1000\t1000\t-1\t",
            "4\t1\t1\t1\t1\t0\t0\t0\t500\t50\t-1\t",
            "5\t1\t1\t1\t1\t1\t0\t0\t50\t50\t-1\t ",
        ]);
        assert!(parse_tsv(&output).unwrap().is_empty());
    }

    #[test]
    fn test_missing_page_row_is_error() {
        let output = tsv(&["4\t1\t1\t1\t1\t0\t0\t0\t500\t50\t-1\t"]);
        assert!(matches!(parse_tsv(&output), Err(OcrError::MalformedOutput(_))));
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_tsv("not\ta\ttsv").is_err());
    }
}
