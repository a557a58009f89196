//! Timeline sources.
//!
//! Two formats exist: the XML event stream written by current simulator
//! versions (`<event time=".." modelName=".." message=".."/>`) and the
//! legacy text log with one `time | modelName | message` line per event.
//! Both are exposed as the same ordered list of [`TimelineEvent`]s. From the
//! legacy log only lines stamped with the contingency-application time are
//! kept.

use crate::xml::{parse_elements, read_xml_file};
use dfl_core::{DflError, DflResult};
use regex::Regex;
use std::path::Path;

/// Time at which the simulator applies contingencies in the legacy log.
pub const DEFAULT_EVENT_TIME: &str = "10";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEvent {
    pub time: String,
    pub model_name: String,
}

#[derive(Debug, Clone)]
pub enum TimelineSource {
    Xml {
        events: Vec<TimelineEvent>,
        raw: String,
    },
    Log {
        events: Vec<TimelineEvent>,
        raw: String,
    },
}

impl TimelineSource {
    /// Read a timeline, probing its format from the content.
    pub fn load(path: &Path, event_time: &str) -> DflResult<Self> {
        let bytes = read_xml_file(path)?;
        Self::parse(&bytes, event_time)
            .map_err(|err| DflError::Parse(format!("timeline '{}': {err}", path.display())))
    }

    /// XML streams are decoded per their declaration; the legacy log is
    /// decoded lossily.
    pub fn parse(bytes: &[u8], event_time: &str) -> DflResult<Self> {
        let raw = String::from_utf8_lossy(bytes).into_owned();
        if looks_like_xml(bytes) {
            let events = parse_elements(bytes)?
                .into_iter()
                .filter(|element| element.name == "event")
                .map(|element| {
                    let model_name = element.attr("modelName").ok_or_else(|| {
                        DflError::Parse("event without modelName attribute".into())
                    })?;
                    Ok(TimelineEvent {
                        time: element.attr("time").unwrap_or_default().to_string(),
                        model_name: model_name.to_string(),
                    })
                })
                .collect::<DflResult<Vec<_>>>()?;
            Ok(TimelineSource::Xml { events, raw })
        } else {
            let events = parse_log(&raw, event_time)?;
            Ok(TimelineSource::Log { events, raw })
        }
    }

    pub fn events(&self) -> &[TimelineEvent] {
        match self {
            TimelineSource::Xml { events, .. } | TimelineSource::Log { events, .. } => events,
        }
    }

    /// Original content, echoed when a check fails.
    pub fn raw(&self) -> &str {
        match self {
            TimelineSource::Xml { raw, .. } | TimelineSource::Log { raw, .. } => raw,
        }
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            TimelineSource::Xml { .. } => "xml",
            TimelineSource::Log { .. } => "log",
        }
    }
}

fn looks_like_xml(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    bytes
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .map_or(false, |&byte| byte == b'<')
}

fn legacy_line_pattern(event_time: &str) -> DflResult<Regex> {
    let pattern = format!(r"(?m)^{}(?:\.0*)?\s*\|\s*([\w-]+)\s*\|.*$", regex::escape(event_time));
    Regex::new(&pattern).map_err(|err| DflError::Config(format!("bad event time '{event_time}': {err}")))
}

fn parse_log(raw: &str, event_time: &str) -> DflResult<Vec<TimelineEvent>> {
    let pattern = legacy_line_pattern(event_time)?;
    Ok(pattern
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|model| TimelineEvent {
            time: event_time.to_string(),
            model_name: model.as_str().to_string(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const XML_TIMELINE: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<timeline xmlns="http://www.rte-france.com/dynawo">
  <event time="10.000000" modelName="L1" message="BRANCH : opening both sides"/>
  <event time="10.000000" modelName="VL1_0_calculatedBus" message="Node : disconnected"/>
</timeline>"#;

    const LOG_TIMELINE: &str = "0 | NETWORK | Simulation started\n\
10 | L1 | BRANCH : opening both sides\n\
10.000 | GEN-2 | GENERATOR : disconnecting\n\
100 | L9 | BRANCH : opening both sides\n";

    #[test]
    fn detects_xml_stream() {
        let source = TimelineSource::parse(XML_TIMELINE.as_bytes(), DEFAULT_EVENT_TIME).unwrap();
        assert_eq!(source.format_name(), "xml");
        let names: Vec<_> = source.events().iter().map(|e| e.model_name.as_str()).collect();
        assert_eq!(names, vec!["L1", "VL1_0_calculatedBus"]);
        assert_eq!(source.events()[0].time, "10.000000");
    }

    #[test]
    fn legacy_log_keeps_only_event_time_lines() {
        let source = TimelineSource::parse(LOG_TIMELINE.as_bytes(), DEFAULT_EVENT_TIME).unwrap();
        assert_eq!(source.format_name(), "log");
        let names: Vec<_> = source.events().iter().map(|e| e.model_name.as_str()).collect();
        assert_eq!(names, vec!["L1", "GEN-2"]);
    }

    #[test]
    fn legacy_log_sentinel_is_configurable() {
        let source = TimelineSource::parse(LOG_TIMELINE.as_bytes(), "100").unwrap();
        let names: Vec<_> = source.events().iter().map(|e| e.model_name.as_str()).collect();
        assert_eq!(names, vec!["L9"]);
    }

    #[test]
    fn event_without_model_name_is_a_parse_error() {
        let raw = br#"<timeline><event time="1"/></timeline>"#;
        assert!(TimelineSource::parse(raw, DEFAULT_EVENT_TIME).is_err());
    }

    #[test]
    fn load_keeps_raw_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("timeline.log");
        fs::write(&path, LOG_TIMELINE).unwrap();
        let source = TimelineSource::load(&path, DEFAULT_EVENT_TIME).unwrap();
        assert_eq!(source.raw(), LOG_TIMELINE);
    }

    #[test]
    fn latin1_stream_is_decoded_from_its_declaration() {
        let mut raw = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<timeline>\n  <event time=\"10\" modelName=\"L1\" message=\"ouverture d".to_vec();
        raw.extend_from_slice(b"\xe9clench\xe9e\"/>\n</timeline>");
        let source = TimelineSource::parse(&raw, DEFAULT_EVENT_TIME).unwrap();
        assert_eq!(source.format_name(), "xml");
        assert_eq!(source.events()[0].model_name, "L1");
    }

    #[test]
    fn truncated_stream_is_a_parse_error() {
        let truncated = &XML_TIMELINE[..XML_TIMELINE.find("</timeline>").unwrap()];
        assert!(TimelineSource::parse(truncated.as_bytes(), DEFAULT_EVENT_TIME).is_err());
    }
}
