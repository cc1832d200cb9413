//! High-score table: text codec and flat-file persistence.
//!
//! The on-disk format is one `name score` record per line, with whitespace
//! inside names folded to underscores so each record always splits into
//! exactly two fields. Decoding is all-or-nothing: a single malformed line
//! voids the whole table, which the loader treats as "no scores yet" rather
//! than an error.

use std::fs;
use std::io;
use std::path::Path;

/// How many records the table keeps.
pub const TABLE_SIZE: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighScore {
    pub name: String,
    pub score: u32,
}

/// Encodes the table as newline-delimited `name score` records.
///
/// Whitespace-separated words of the name are rejoined with underscores; an
/// empty name becomes a single underscore so the record still has two
/// fields.
pub fn encode(scores: &[HighScore]) -> String {
    let mut out = String::new();
    for hs in scores {
        let words: Vec<&str> = hs.name.split_whitespace().collect();
        if words.is_empty() {
            out.push('_');
        } else {
            out.push_str(&words.join("_"));
        }
        out.push(' ');
        out.push_str(&hs.score.to_string());
        out.push('\n');
    }
    out
}

/// Decodes a table, recovering spaces from underscores in names.
///
/// Any line that does not split into a name field and an integer score
/// voids the entire decode; partial recovery is deliberately not attempted.
pub fn decode(text: &str) -> Vec<HighScore> {
    let mut out = Vec::new();
    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [name, score] = fields[..] else {
            return Vec::new();
        };
        let Ok(score) = score.parse::<u32>() else {
            return Vec::new();
        };
        out.push(HighScore {
            name: name.replace('_', " "),
            score,
        });
    }
    out
}

/// Reads the table from disk. A missing or unreadable file is an empty
/// table, never an error.
pub fn load(path: &Path) -> Vec<HighScore> {
    match fs::read_to_string(path) {
        Ok(text) => decode(&text),
        Err(_) => Vec::new(),
    }
}

/// Writes the table to disk with no trailing framing.
pub fn save(path: &Path, scores: &[HighScore]) -> io::Result<()> {
    fs::write(path, encode(scores))
}

/// Inserts a record keeping the table descending by score, capped at
/// [`TABLE_SIZE`].
pub fn record(scores: &mut Vec<HighScore>, name: &str, score: u32) {
    let at = scores
        .iter()
        .position(|hs| hs.score < score)
        .unwrap_or(scores.len());
    scores.insert(
        at,
        HighScore {
            name: name.to_string(),
            score,
        },
    );
    scores.truncate(TABLE_SIZE);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hs(name: &str, score: u32) -> HighScore {
        HighScore {
            name: name.to_string(),
            score,
        }
    }

    #[test]
    fn round_trip_single_record() {
        let table = vec![hs("Ann", 500)];
        assert_eq!(decode(&encode(&table)), table);
    }

    #[test]
    fn names_with_spaces_survive_the_trip() {
        let table = vec![hs("Ann Lee", 500), hs("Bob", 200)];
        let text = encode(&table);
        assert_eq!(text, "Ann_Lee 500\nBob 200\n");
        assert_eq!(decode(&text), table);
    }

    #[test]
    fn empty_name_encodes_as_underscore() {
        let text = encode(&[hs("", 42)]);
        assert_eq!(text, "_ 42\n");
    }

    #[test]
    fn wrong_field_count_voids_everything() {
        assert_eq!(decode("Ann 500\nBob 200 extra\n"), Vec::new());
        assert_eq!(decode("JustAName\nBob 200\n"), Vec::new());
    }

    #[test]
    fn unparsable_score_voids_everything() {
        assert_eq!(decode("Ann 500\nBob twelve\n"), Vec::new());
    }

    #[test]
    fn empty_input_decodes_to_empty_table() {
        assert_eq!(decode(""), Vec::new());
    }

    #[test]
    fn record_keeps_descending_order() {
        let mut table = vec![hs("a", 900), hs("b", 300)];
        record(&mut table, "c", 500);
        let scores: Vec<u32> = table.iter().map(|h| h.score).collect();
        assert_eq!(scores, vec![900, 500, 300]);
    }

    #[test]
    fn record_caps_the_table() {
        let mut table = Vec::new();
        for i in 0..20 {
            record(&mut table, "p", i * 10);
        }
        assert_eq!(table.len(), TABLE_SIZE);
        assert_eq!(table[0].score, 190);
    }

    #[test]
    fn missing_file_loads_empty() {
        let table = load(Path::new("/definitely/not/here/scores.txt"));
        assert!(table.is_empty());
    }
}
