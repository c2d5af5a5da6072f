// src/schema/normalize.rs

use super::types::Record;

/// Reconcile `record` against the final header list: every header present,
/// missing ones empty, anything not in `headers` dropped.
///
/// Only meaningful once every partition has been extracted and the header
/// list is final; `ExtractionSession::finish` is the only caller in the crate.
pub fn normalize(record: &Record, headers: &[String]) -> Record {
    headers
        .iter()
        .map(|h| (h.as_str(), record.get(h).unwrap_or("")))
        .collect()
}

pub fn normalize_all(records: &[Record], headers: &[String]) -> Vec<Record> {
    records.iter().map(|r| normalize(r, headers)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(h: &[&str]) -> Vec<String> {
        h.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fills_missing_and_drops_extra() {
        let r: Record = [("Year", "2015"), ("Stray", "x")].into_iter().collect();
        let h = headers(&["Year", "Date", "Notes_title"]);
        let n = normalize(&r, &h);
        assert_eq!(n.len(), 3);
        assert_eq!(n.get("Year"), Some("2015"));
        assert_eq!(n.get("Date"), Some(""));
        assert_eq!(n.get("Notes_title"), Some(""));
        assert!(!n.contains_key("Stray"));
    }

    #[test]
    fn test_idempotent() {
        let h = headers(&["Year", "Date", "ASIC_Gazette_title", "ASIC_Gazette_url"]);
        let samples: Vec<Record> = vec![
            Record::new(),
            [("Year", "2011"), ("Date", "1/1/2011")].into_iter().collect(),
            [("ASIC_Gazette_url_2", "u"), ("Other", "o")].into_iter().collect(),
        ];
        for r in &samples {
            let once = normalize(r, &h);
            assert_eq!(normalize(&once, &h), once);
        }
    }

    #[test]
    fn test_empty_headers_yield_empty_record() {
        let r: Record = [("Year", "2015")].into_iter().collect();
        assert!(normalize(&r, &[]).is_empty());
    }
}
