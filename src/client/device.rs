use serde::{Deserialize, Deserializer};

/// One entity from the Home Assistant state machine
///
/// This is a read-only projection of what Home Assistant reported at the time of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    id: String,
    display_name: Option<String>,
    reported_state: Option<String>,
}

impl Device {
    pub fn new<S: Into<String>>(id: S, display_name: Option<S>, reported_state: Option<S>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.map(Into::into),
            reported_state: reported_state.map(Into::into),
        }
    }

    /// Entity id, e.g. `media_player.living_room`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The entity's `friendly_name` attribute
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// State string as reported, e.g. `off`, `idle`, `playing` or `unavailable`
    pub fn reported_state(&self) -> Option<&str> {
        self.reported_state.as_deref()
    }
}

impl<'de> Deserialize<'de> for Device {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Value {
            entity_id: String,
            #[serde(default)]
            state: Option<String>,
            #[serde(default)]
            attributes: Option<Attributes>,
        }
        #[derive(Deserialize)]
        struct Attributes {
            #[serde(default)]
            #[serde(deserialize_with = "parse_friendly_name")]
            friendly_name: Option<String>,
        }

        let helper = Value::deserialize(deserializer)?;

        Ok(Device {
            id: helper.entity_id,
            display_name: helper.attributes.and_then(|a| a.friendly_name),
            reported_state: helper.state,
        })
    }
}

// Integrations occasionally put non-string values here; treat those as unnamed.
fn parse_friendly_name<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(String::from))
}
