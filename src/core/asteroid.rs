use serde::Deserialize;

/// One dated close approach of an asteroid and the body it was orbiting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CloseApproachObservation {
    #[serde(rename = "close_approach_date")]
    pub date: String,
    #[serde(rename = "orbiting_body")]
    pub orbiting_body: String,
}

/// A change of orbiting body between two chronologically adjacent observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPath {
    pub from_body: String,
    pub to_body: String,
    pub from_date: String,
    pub to_date: String,
}

/// Single-asteroid lookup payload from the NEO feed. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NeoObject {
    #[serde(default)]
    pub close_approach_data: Option<Vec<CloseApproachObservation>>,
}

impl NeoObject {
    pub fn into_observations(self) -> Vec<CloseApproachObservation> {
        self.close_approach_data.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::NeoObject;

    #[test]
    fn decode_ignores_extra_fields() {
        let body = r#"{
            "id": "3542519",
            "name": "(2010 PK9)",
            "is_potentially_hazardous_asteroid": false,
            "close_approach_data": [
                {"close_approach_date": "1917-04-30", "orbiting_body": "Juptr", "miss_distance": {}}
            ]
        }"#;
        let neo: NeoObject = serde_json::from_str(body).unwrap();
        let obs = neo.into_observations();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].date, "1917-04-30");
        assert_eq!(obs[0].orbiting_body, "Juptr");
    }

    #[test]
    fn missing_approaches_is_empty() {
        let neo: NeoObject = serde_json::from_str(r#"{"id": "1"}"#).unwrap();
        assert!(neo.into_observations().is_empty());
    }
}
