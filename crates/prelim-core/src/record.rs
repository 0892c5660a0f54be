//! Result records and their single-line wire format.
//!
//! Each record renders as one compact JSON object with a fixed key order:
//! `chunk, job, oid, score, qstart, qstop, sstart, sstop`. Strings are JSON
//! escaped, so a record never spans lines and its values can't be confused
//! with structure. Negative numbers (the `-1` sentinel) round-trip as-is.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Hit;

/// Value every numeric field takes in the "no hits" record.
pub const SENTINEL: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ResultRecord {
    pub chunk: String,
    #[serde(rename = "job")]
    pub job_id: String,
    #[serde(rename = "oid")]
    pub object_id: i32,
    pub score: i32,
    #[serde(rename = "qstart")]
    pub query_start: i32,
    #[serde(rename = "qstop")]
    pub query_end: i32,
    #[serde(rename = "sstart")]
    pub subject_start: i32,
    #[serde(rename = "sstop")]
    pub subject_end: i32,
}

impl ResultRecord {
    pub fn from_hit(hit: &Hit, chunk: &str, job_id: &str) -> Self {
        Self {
            chunk: chunk.to_string(),
            job_id: job_id.to_string(),
            object_id: hit.object_id,
            score: hit.score,
            query_start: hit.query_start,
            query_end: hit.query_end,
            subject_start: hit.subject_start,
            subject_end: hit.subject_end,
        }
    }

    /// The reserved record meaning "no real hits to report".
    pub fn sentinel(chunk: &str, job_id: &str) -> Self {
        Self {
            chunk: chunk.to_string(),
            job_id: job_id.to_string(),
            object_id: SENTINEL,
            score: SENTINEL,
            query_start: SENTINEL,
            query_end: SENTINEL,
            subject_start: SENTINEL,
            subject_end: SENTINEL,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.numeric_fields().iter().all(|v| *v == SENTINEL)
    }

    pub fn numeric_fields(&self) -> [i32; 6] {
        [
            self.object_id,
            self.score,
            self.query_start,
            self.query_end,
            self.subject_start,
            self.subject_end,
        ]
    }

    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn parse_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line.trim_end())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit() -> Hit {
        Hit { object_id: 17, score: 92, query_start: 0, query_end: 41, subject_start: 1200, subject_end: 1241 }
    }

    #[test]
    fn line_has_fixed_key_order() {
        let line = ResultRecord::from_hit(&hit(), "c1", "job1").to_line().unwrap();
        assert_eq!(
            line,
            r#"{"chunk":"c1","job":"job1","oid":17,"score":92,"qstart":0,"qstop":41,"sstart":1200,"sstop":1241}"#
        );
    }

    #[test]
    fn sentinel_line_keeps_minus_signs() {
        let line = ResultRecord::sentinel("c1", "job1").to_line().unwrap();
        assert_eq!(
            line,
            r#"{"chunk":"c1","job":"job1","oid":-1,"score":-1,"qstart":-1,"qstop":-1,"sstart":-1,"sstop":-1}"#
        );
        let back = ResultRecord::parse_line(&line).unwrap();
        assert!(back.is_sentinel());
    }

    #[test]
    fn strings_with_delimiters_stay_on_one_line() {
        let rec = ResultRecord::from_hit(&hit(), "c\"1\n,-1}", "job\t{x}");
        let line = rec.to_line().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(ResultRecord::parse_line(&line).unwrap(), rec);
    }

    #[test]
    fn parse_rejects_unknown_and_missing_fields() {
        let extra = r#"{"chunk":"c","job":"j","oid":1,"score":1,"qstart":1,"qstop":1,"sstart":1,"sstop":1,"RID":"x"}"#;
        assert!(ResultRecord::parse_line(extra).is_err());
        let missing = r#"{"chunk":"c","job":"j","oid":1}"#;
        assert!(ResultRecord::parse_line(missing).is_err());
    }

    #[test]
    fn parse_tolerates_trailing_newline() {
        let line = format!("{}\n", ResultRecord::from_hit(&hit(), "c", "j").to_line().unwrap());
        assert_eq!(ResultRecord::parse_line(&line).unwrap().object_id, 17);
    }

    #[test]
    fn real_hit_is_not_sentinel() {
        assert!(!ResultRecord::from_hit(&hit(), "c", "j").is_sentinel());
    }
}
