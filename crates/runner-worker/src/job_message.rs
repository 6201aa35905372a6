// Job request message received from the listener in a `NewJobRequest` body.
// Only the parts the worker reads are modelled; unknown fields are ignored.

use serde::{Deserialize, Serialize};
use indexmap::IndexMap;

/// Deserialized job request.
///
/// `environment` and its `variables` stay optional here so that their absence
/// can be reported as a validation failure instead of silently defaulting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequestMessage {
    #[serde(default)]
    pub job_id: String,

    #[serde(default)]
    pub job_name: String,

    #[serde(default)]
    pub environment: Option<JobEnvironment>,

    /// Script steps executed by the default job engine.
    #[serde(default)]
    pub steps: Vec<JobStep>,
}

/// Variables, secret hints and service endpoints for the job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEnvironment {
    #[serde(default)]
    pub variables: Option<IndexMap<String, String>>,

    #[serde(default, rename = "mask", alias = "maskHints")]
    pub mask_hints: Option<Vec<MaskHint>>,

    #[serde(default)]
    pub endpoints: Option<Vec<ServiceEndpoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskType {
    #[serde(alias = "Regex")]
    Regex,
    #[serde(alias = "Variable")]
    Variable,
}

/// Describes a value or pattern that must be redacted from job output.
///
/// For `Regex` the value is the pattern itself; for `Variable` it names a key
/// in `JobEnvironment::variables`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskHint {
    #[serde(rename = "type")]
    pub mask_type: MaskType,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub authorization: Option<EndpointAuthorization>,
}

/// Authorization data for a service endpoint. Every parameter value is a secret;
/// parameters keep their document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointAuthorization {
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub parameters: Option<IndexMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStep {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub continue_on_error: bool,
}

impl JobRequestMessage {
    /// The job variables, if the message carries them.
    pub fn variables(&self) -> Option<&IndexMap<String, String>> {
        self.environment.as_ref()?.variables.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_environment() {
        let json = r#"{
            "jobId": "abc-123",
            "jobName": "Build",
            "environment": {
                "variables": {"system.culture": "en-US", "token": "t0k"},
                "mask": [
                    {"type": "regex", "value": "ghp_[A-Za-z0-9]+"},
                    {"type": "Variable", "value": "token"}
                ],
                "endpoints": [
                    {"name": "SystemVssConnection", "url": "https://example.test/",
                     "authorization": {"scheme": "OAuth", "parameters": {"AccessToken": "a b"}}}
                ]
            },
            "steps": [{"displayName": "hello", "script": "echo hi", "continueOnError": true}]
        }"#;
        let msg: JobRequestMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.job_id, "abc-123");
        assert_eq!(msg.variables().unwrap()["system.culture"], "en-US");

        let env = msg.environment.as_ref().unwrap();
        let hints = env.mask_hints.as_ref().unwrap();
        assert_eq!(hints[0].mask_type, MaskType::Regex);
        assert_eq!(hints[1].mask_type, MaskType::Variable);

        let auth = env.endpoints.as_ref().unwrap()[0].authorization.as_ref().unwrap();
        assert_eq!(auth.parameters.as_ref().unwrap()["AccessToken"], "a b");
        assert!(msg.steps[0].continue_on_error);
    }

    #[test]
    fn test_absent_and_null_fields_stay_none() {
        let msg: JobRequestMessage = serde_json::from_str(r#"{"jobId":"x"}"#).unwrap();
        assert!(msg.environment.is_none());
        assert!(msg.variables().is_none());

        let msg: JobRequestMessage =
            serde_json::from_str(r#"{"environment":{"variables":null,"mask":null}}"#).unwrap();
        let env = msg.environment.unwrap();
        assert!(env.variables.is_none());
        assert!(env.mask_hints.is_none());
        assert!(env.endpoints.is_none());
    }

    #[test]
    fn test_maps_keep_document_order() {
        let json = r#"{"environment":{
            "variables":{"zeta":"1","alpha":"2","mid":"3"},
            "endpoints":[{"authorization":{"parameters":{"username":"u","password":"p","apiKey":"k"}}}]
        }}"#;
        let msg: JobRequestMessage = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = msg.variables().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);

        let env = msg.environment.unwrap();
        let auth = env.endpoints.unwrap().remove(0).authorization.unwrap();
        let values: Vec<String> = auth.parameters.unwrap().into_values().collect();
        assert_eq!(values, ["u", "p", "k"]);
    }

    #[test]
    fn test_mask_hints_alias() {
        let json = r#"{"variables":{},"maskHints":[{"type":"variable","value":"k"}]}"#;
        let env: JobEnvironment = serde_json::from_str(json).unwrap();
        assert_eq!(env.mask_hints.unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_mask_type_rejected() {
        let json = r#"{"type":"glob","value":"*"}"#;
        assert!(serde_json::from_str::<MaskHint>(json).is_err());
    }
}
