//! Cognitive (NLP) data carried by message annotations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// NLP annotations of a message collected into one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NlpInformation {
    pub keywords: Vec<Value>,
    pub entities: Vec<Value>,
    pub concepts: Vec<Value>,
    pub taxonomy: Vec<Value>,
    pub dates: Vec<Value>,
    pub doc_sentiment: Value,
    pub relations: Vec<Value>,
}

impl Default for NlpInformation {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            entities: Vec::new(),
            concepts: Vec::new(),
            taxonomy: Vec::new(),
            dates: Vec::new(),
            doc_sentiment: Value::Object(Map::new()),
            relations: Vec::new(),
        }
    }
}

fn list(annotation: &Value, key: &str) -> Option<Vec<Value>> {
    annotation.get(key).and_then(Value::as_array).cloned()
}

/// Pluck NLP data out of a message whose annotations are already decoded.
///
/// An annotation type such as `message-nlp-keywords` lands in `keywords`;
/// anything else (e.g. a message focus) is ignored.
pub fn extract_information(message: &Value) -> NlpInformation {
    let mut nlp = NlpInformation::default();

    let Some(annotations) = message.get("annotations").and_then(Value::as_array) else {
        warn!("Information extraction on message with undefined annotations");
        return nlp;
    };

    for annotation in annotations {
        let Some(kind) = annotation.get("type").and_then(Value::as_str) else {
            continue;
        };
        let shortened = kind.rsplit('-').next().unwrap_or(kind);

        let slot = match shortened {
            "keywords" => &mut nlp.keywords,
            "entities" => &mut nlp.entities,
            "concepts" => &mut nlp.concepts,
            "taxonomy" => &mut nlp.taxonomy,
            "dates" => &mut nlp.dates,
            "relations" => &mut nlp.relations,
            "docSentiment" => {
                if let Some(sentiment) = annotation.get(shortened) {
                    nlp.doc_sentiment = sentiment.clone();
                }
                continue;
            }
            _ => continue,
        };

        if let Some(values) = list(annotation, shortened) {
            *slot = values;
        }
    }

    nlp
}
