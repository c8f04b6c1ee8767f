use serde::{Deserialize, Serialize};

/// key: cloud-product-limits -> per-resource caps pushed by CWS
///
/// A missing section or a missing value means no limit was communicated, which is
/// not the same as an explicit zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boards: Option<BoardsLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<FilesLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrations: Option<IntegrationsLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<MessagesLimits>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<TeamsLimits>,
}

impl ProductLimits {
    pub fn is_empty(&self) -> bool {
        self.boards.is_none()
            && self.files.is_none()
            && self.integrations.is_none()
            && self.messages.is_none()
            && self.teams.is_none()
    }

    /// Names of the sections present, for log lines.
    pub fn sections(&self) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if self.boards.is_some() {
            sections.push("boards");
        }
        if self.files.is_some() {
            sections.push("files");
        }
        if self.integrations.is_some() {
            sections.push("integrations");
        }
        if self.messages.is_some() {
            sections.push("messages");
        }
        if self.teams.is_some() {
            sections.push("teams");
        }
        sections
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cards: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_storage: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationsLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<i32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamsLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_limits_serialize_to_empty_object() {
        let limits = ProductLimits::default();
        assert!(limits.is_empty());
        assert_eq!(serde_json::to_value(&limits).unwrap(), json!({}));
    }

    #[test]
    fn zero_limit_survives_but_absent_limit_is_omitted() {
        let limits = ProductLimits {
            boards: Some(BoardsLimits {
                cards: Some(0),
                views: None,
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&limits).unwrap();
        assert_eq!(value, json!({ "boards": { "cards": 0 } }));

        let decoded: ProductLimits = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, limits);
        assert_eq!(decoded.sections(), vec!["boards"]);
    }

    #[test]
    fn explicit_nulls_decode_as_absent() {
        let decoded: ProductLimits = serde_json::from_value(json!({
            "messages": { "history": null },
            "teams": null,
        }))
        .unwrap();
        assert_eq!(decoded.messages, Some(MessagesLimits { history: None }));
        assert!(decoded.teams.is_none());
    }
}
