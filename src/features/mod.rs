//! Health metric types and deterministic feature derivation.
//!
//! The classifier was trained on the Pima Indians diabetes dataset plus ten
//! engineered columns. `derive` reproduces that feature engineering exactly;
//! the serde renames reproduce the training column names on the wire.

pub mod catalog;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw health measurements supplied by the user.
///
/// No range validation happens here; out-of-range values are the classifier's
/// concern. Missing fields deserialize to 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawHealthMetrics {
    /// Number of times pregnant
    #[serde(rename = "Pregnancies", default)]
    pub pregnancies: f64,

    /// Plasma glucose concentration, 2-hour oral glucose tolerance test (mg/dL)
    #[serde(rename = "Glucose", default)]
    pub glucose: f64,

    /// Diastolic blood pressure (mmHg)
    #[serde(rename = "BloodPressure", default)]
    pub blood_pressure: f64,

    /// Triceps skin fold thickness (mm)
    #[serde(rename = "SkinThickness", default)]
    pub skin_thickness: f64,

    /// 2-hour serum insulin (μU/mL)
    #[serde(rename = "Insulin", default)]
    pub insulin: f64,

    /// Body mass index (kg/m²)
    #[serde(rename = "BMI", default)]
    pub bmi: f64,

    /// Diabetes pedigree function (likelihood based on family history)
    #[serde(rename = "DiabetesPedigreeFunction", default)]
    pub pedigree: f64,

    /// Age in years
    #[serde(rename = "Age", default)]
    pub age: f64,
}

impl RawHealthMetrics {
    /// Build metrics from loosely-typed string fields.
    ///
    /// Missing or unparseable values become 0.0. This is the single place the
    /// zero-defaulting policy lives; callers never coerce fields themselves.
    pub fn from_fields(fields: &BTreeMap<String, String>) -> Self {
        let num = |key: &str| -> f64 {
            fields
                .get(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0.0)
        };

        Self {
            pregnancies: num("Pregnancies"),
            glucose: num("Glucose"),
            blood_pressure: num("BloodPressure"),
            skin_thickness: num("SkinThickness"),
            insulin: num("Insulin"),
            bmi: num("BMI"),
            pedigree: num("DiabetesPedigreeFunction"),
            age: num("Age"),
        }
    }

    /// High-risk demo profile used by the intake form and the test suite.
    pub fn sample() -> Self {
        Self {
            pregnancies: 5.0,
            glucose: 180.0,
            blood_pressure: 90.0,
            skin_thickness: 40.0,
            insulin: 200.0,
            bmi: 35.2,
            pedigree: 1.2,
            age: 55.0,
        }
    }
}

/// Raw metrics plus the engineered features the classifier expects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedFeatureSet {
    #[serde(flatten)]
    pub raw: RawHealthMetrics,

    /// Glucose level relative to body mass
    #[serde(rename = "Glucose_BMI_Ratio", default)]
    pub glucose_bmi_ratio: f64,

    /// Age × glucose interaction term
    #[serde(rename = "Age_Glucose_Int", default)]
    pub age_glucose_interaction: f64,

    /// Insulin level relative to body mass
    #[serde(rename = "Insulin_BMI_Ratio", default)]
    pub insulin_bmi_ratio: f64,

    /// Age × BMI interaction term
    #[serde(rename = "Age_BMI_Int", default)]
    pub age_bmi_interaction: f64,

    /// 1 if BMI > 30, else 0
    #[serde(rename = "Is_Obese", default)]
    pub is_obese: u8,

    /// 1 if age < 25, else 0
    #[serde(rename = "Is_Young", default)]
    pub is_young: u8,

    /// Glucose squared, models non-linear glucose effects
    #[serde(rename = "Glucose2", default)]
    pub glucose_squared: f64,

    /// BMI squared, models non-linear BMI effects
    #[serde(rename = "BMI2", default)]
    pub bmi_squared: f64,

    /// ln(pregnancies + 1), skew correction
    #[serde(rename = "Pregnancies_log1p", default)]
    pub pregnancies_log1p: f64,

    /// ln(insulin + 1), skew correction
    #[serde(rename = "Insulin_log1p", default)]
    pub insulin_log1p: f64,
}

/// Derive the extended feature set from raw metrics.
///
/// Pure and infallible: identical input yields bit-identical output. Ratios
/// with a zero denominator are clamped to 0.0 so no NaN or infinity reaches
/// the classifier.
pub fn derive(raw: RawHealthMetrics) -> DerivedFeatureSet {
    DerivedFeatureSet {
        raw,
        glucose_bmi_ratio: safe_ratio(raw.glucose, raw.bmi),
        age_glucose_interaction: raw.age * raw.glucose,
        insulin_bmi_ratio: safe_ratio(raw.insulin, raw.bmi),
        age_bmi_interaction: raw.age * raw.bmi,
        is_obese: u8::from(raw.bmi > 30.0),
        is_young: u8::from(raw.age < 25.0),
        glucose_squared: raw.glucose * raw.glucose,
        bmi_squared: raw.bmi * raw.bmi,
        pregnancies_log1p: raw.pregnancies.ln_1p(),
        insulin_log1p: raw.insulin.ln_1p(),
    }
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_known_profile() {
        let derived = derive(RawHealthMetrics::sample());

        assert!((derived.glucose_bmi_ratio - 5.1136).abs() < 1e-3);
        assert_eq!(derived.age_glucose_interaction, 9900.0);
        assert!((derived.insulin_bmi_ratio - 5.6818).abs() < 1e-3);
        assert_eq!(derived.age_bmi_interaction, 1936.0);
        assert_eq!(derived.is_obese, 1);
        assert_eq!(derived.is_young, 0);
        assert_eq!(derived.glucose_squared, 32400.0);
        assert!((derived.bmi_squared - 1239.04).abs() < 1e-6);
        assert!((derived.pregnancies_log1p - 1.7918).abs() < 1e-4);
        assert!((derived.insulin_log1p - 5.3033).abs() < 1e-4);
    }

    #[test]
    fn test_derive_is_deterministic() {
        let raw = RawHealthMetrics {
            glucose: 0.1,
            bmi: 1.0 / 3.0,
            insulin: 7.7,
            age: 33.3,
            ..RawHealthMetrics::default()
        };

        let first = derive(raw);
        let second = derive(raw);
        assert_eq!(first, second);
        assert_eq!(
            first.glucose_bmi_ratio.to_bits(),
            second.glucose_bmi_ratio.to_bits()
        );
        assert_eq!(
            first.insulin_log1p.to_bits(),
            second.insulin_log1p.to_bits()
        );
    }

    #[test]
    fn test_obesity_flag_boundary() {
        let at_threshold = derive(RawHealthMetrics {
            bmi: 30.0,
            ..RawHealthMetrics::default()
        });
        assert_eq!(at_threshold.is_obese, 0);

        let above = derive(RawHealthMetrics {
            bmi: 30.001,
            ..RawHealthMetrics::default()
        });
        assert_eq!(above.is_obese, 1);
    }

    #[test]
    fn test_youth_flag_boundary() {
        let at_threshold = derive(RawHealthMetrics {
            age: 25.0,
            ..RawHealthMetrics::default()
        });
        assert_eq!(at_threshold.is_young, 0);

        let below = derive(RawHealthMetrics {
            age: 24.9,
            ..RawHealthMetrics::default()
        });
        assert_eq!(below.is_young, 1);
    }

    #[test]
    fn test_zero_bmi_clamps_ratios() {
        let derived = derive(RawHealthMetrics {
            glucose: 120.0,
            insulin: 80.0,
            bmi: 0.0,
            ..RawHealthMetrics::default()
        });

        assert_eq!(derived.glucose_bmi_ratio, 0.0);
        assert_eq!(derived.insulin_bmi_ratio, 0.0);
        assert_eq!(derived.bmi_squared, 0.0);
    }

    #[test]
    fn test_from_fields_defaults_missing_and_garbage() {
        let mut fields = BTreeMap::new();
        fields.insert("Glucose".to_string(), "140".to_string());
        fields.insert("BMI".to_string(), "not-a-number".to_string());

        let raw = RawHealthMetrics::from_fields(&fields);
        assert_eq!(raw.glucose, 140.0);
        assert_eq!(raw.bmi, 0.0);
        assert_eq!(raw.age, 0.0);
    }

    #[test]
    fn test_wire_names_match_training_columns() {
        let json = serde_json::to_value(derive(RawHealthMetrics::sample())).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 18);
        for key in [
            "Pregnancies",
            "Glucose",
            "BloodPressure",
            "SkinThickness",
            "Insulin",
            "BMI",
            "DiabetesPedigreeFunction",
            "Age",
            "Glucose_BMI_Ratio",
            "Age_Glucose_Int",
            "Insulin_BMI_Ratio",
            "Age_BMI_Int",
            "Is_Obese",
            "Is_Young",
            "Glucose2",
            "BMI2",
            "Pregnancies_log1p",
            "Insulin_log1p",
        ] {
            assert!(object.contains_key(key), "missing wire field {key}");
        }
    }
}
