//! Flat string-keyed transport encoding for cross-step workflow state.
//!
//! Each workflow step is an independent request/response cycle; the only
//! channel between them is the map produced here, carried in the client's
//! next navigation target. There is no server-side session store.
//!
//! Precision contract: floats are rendered with Rust's shortest round-trip
//! `Display` formatting, so `decode(encode(x))` reproduces every finite f64
//! bit-exactly. Keys use the classifier's wire names; the schema is versioned
//! so the encode and decode sites cannot drift silently.

use std::collections::BTreeMap;

use crate::classifier::ClassificationResult;
use crate::error::{Error, Result};
use crate::features::{DerivedFeatureSet, RawHealthMetrics};

/// Schema version stamped into every encoded map.
pub const STATE_VERSION: &str = "1";

const VERSION_KEY: &str = "_v";
/// The classifier verdict rides as one opaque JSON string under this key.
const ASSESSMENT_KEY: &str = "assessment";

/// Encode a feature set (and optionally the classifier verdict) into the
/// flat transport map.
pub fn encode(
    features: &DerivedFeatureSet,
    classification: Option<&ClassificationResult>,
) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    map.insert(VERSION_KEY.to_string(), STATE_VERSION.to_string());

    let raw = &features.raw;
    put(&mut map, "Pregnancies", raw.pregnancies);
    put(&mut map, "Glucose", raw.glucose);
    put(&mut map, "BloodPressure", raw.blood_pressure);
    put(&mut map, "SkinThickness", raw.skin_thickness);
    put(&mut map, "Insulin", raw.insulin);
    put(&mut map, "BMI", raw.bmi);
    put(&mut map, "DiabetesPedigreeFunction", raw.pedigree);
    put(&mut map, "Age", raw.age);

    put(&mut map, "Glucose_BMI_Ratio", features.glucose_bmi_ratio);
    put(&mut map, "Age_Glucose_Int", features.age_glucose_interaction);
    put(&mut map, "Insulin_BMI_Ratio", features.insulin_bmi_ratio);
    put(&mut map, "Age_BMI_Int", features.age_bmi_interaction);
    map.insert("Is_Obese".to_string(), features.is_obese.to_string());
    map.insert("Is_Young".to_string(), features.is_young.to_string());
    put(&mut map, "Glucose2", features.glucose_squared);
    put(&mut map, "BMI2", features.bmi_squared);
    put(&mut map, "Pregnancies_log1p", features.pregnancies_log1p);
    put(&mut map, "Insulin_log1p", features.insulin_log1p);

    if let Some(classification) = classification {
        map.insert(
            ASSESSMENT_KEY.to_string(),
            serde_json::to_string(classification)?,
        );
    }

    Ok(map)
}

/// Decode a transport map back into the feature set and, when present and
/// readable, the classifier verdict.
///
/// Missing numeric fields decode to 0.0. A missing or unparseable verdict
/// yields `None` rather than an error; the verdict is optional context, not a
/// hard dependency. An unknown schema version is rejected.
pub fn decode(
    map: &BTreeMap<String, String>,
) -> Result<(DerivedFeatureSet, Option<ClassificationResult>)> {
    match map.get(VERSION_KEY).map(String::as_str) {
        Some(STATE_VERSION) => {}
        other => {
            return Err(Error::Validation(format!(
                "unsupported transport schema version {other:?}, expected {STATE_VERSION:?}"
            )))
        }
    }

    let num = |key: &str| -> f64 {
        map.get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0)
    };
    let flag = |key: &str| -> u8 { map.get(key).and_then(|v| v.parse().ok()).unwrap_or(0) };

    let features = DerivedFeatureSet {
        raw: RawHealthMetrics::from_fields(map),
        glucose_bmi_ratio: num("Glucose_BMI_Ratio"),
        age_glucose_interaction: num("Age_Glucose_Int"),
        insulin_bmi_ratio: num("Insulin_BMI_Ratio"),
        age_bmi_interaction: num("Age_BMI_Int"),
        is_obese: flag("Is_Obese"),
        is_young: flag("Is_Young"),
        glucose_squared: num("Glucose2"),
        bmi_squared: num("BMI2"),
        pregnancies_log1p: num("Pregnancies_log1p"),
        insulin_log1p: num("Insulin_log1p"),
    };

    let classification = map
        .get(ASSESSMENT_KEY)
        .and_then(|raw| serde_json::from_str(raw).ok());

    Ok((features, classification))
}

fn put(map: &mut BTreeMap<String, String>, key: &str, value: f64) {
    map.insert(key.to_string(), format!("{value}"));
}
