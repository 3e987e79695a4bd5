//! Prompt templates for the generation backend.
//!
//! One registry, two templates, keyed by document kind. The templates spell
//! out the sections the generated markdown must contain; the backend itself
//! is opaque and its output is never validated against them.

use tera::{Context, Tera};

use crate::error::Result;
use crate::features::DerivedFeatureSet;

use super::GenerationRequest;

const DIET_TEMPLATE_NAME: &str = "diet";
const REPORT_TEMPLATE_NAME: &str = "report";

const DIET_TEMPLATE: &str = r#"Role: You are an expert dietitian and certified diabetes educator with 20 years of experience creating personalized nutrition and lifestyle plans for individuals at high risk for type 2 diabetes. Your approach is evidence-based, empathetic, and highly practical.

Objective: Generate a detailed, actionable, personalized 4-week diabetes prevention and management plan for a client based on the health metrics below. The goal is to promote weight loss, improve insulin sensitivity, and normalize blood glucose levels.

Client Health Metrics:
{{ metrics }}

Task Requirements. The response must be structured logically and include the following distinct sections:

1. Health Metrics Summary: present the provided metrics in a clear table and briefly interpret the key ones (Glucose, Insulin, BMI, Blood Pressure) in the context of diabetes risk.

2. Core Dietary Principles: the foundational principles of the plan, focused on glycemic control, healthy fats, lean proteins, and high fiber intake, with the "why" explained in simple terms.

3. Detailed 4-Week Meal Plan: a day-by-day plan for each of the four weeks, with Breakfast, Lunch, Dinner, and two Snacks per day. Include specific, realistic portion sizes for each food item (e.g. "1/2 cup cooked quinoa", "4 ounces grilled chicken breast") in standard household measurements. Keep it varied and easy to prepare.

4. Foods to Limit or Avoid: a categorized list covering sugary foods and drinks, refined carbohydrates, unhealthy fats, and processed meats.

5. Lifestyle and Behavior Recommendations: a progressive 4-week physical activity plan (cardio and resistance), stress management techniques, and sleep hygiene guidance (7-9 hours, with tips).

6. Weekly Goals and Monitoring: one clear, measurable goal per week (hydration, meal timing and portions, activity targets, mindful eating), plus self-monitoring of fasting glucose and weekly weight where a doctor advises it.

7. Hydration Plan: a daily water intake goal, beneficial unsweetened beverage options, and why hydration matters for blood sugar regulation.

Format everything in clear markdown with headings, subheadings, bullet points, and tables. Keep the tone professional, encouraging, and supportive; the advice should feel empowering, not restrictive.
"#;

const REPORT_TEMPLATE: &str = r#"You are a health assistant. Based on the following user's health metrics and diabetes assessment result, generate a personalized diabetes risk report and health guidance.

**Assessment Result**: {{ predicted_class }} (probability {{ probability }}%, risk level: {{ risk_level }})

**Health Metrics**:
```json
{{ metrics }}
```

Include in the report:
- Risk interpretation in layman's terms
- Contributing factors based on each of the metrics
- Suggested lifestyle and diet changes
- When to seek medical help
- Emotional/mental wellness tips
- Encouraging summary

Format everything in readable **Markdown**.
"#;

/// Registry of prompt templates, one per document kind.
pub struct PromptRegistry {
    tera: Tera,
}

impl PromptRegistry {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(DIET_TEMPLATE_NAME, DIET_TEMPLATE)?;
        tera.add_raw_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE)?;

        Ok(Self { tera })
    }

    /// Render the instruction for a generation request.
    pub fn render(&self, request: &GenerationRequest) -> Result<String> {
        match request {
            GenerationRequest::Diet { features } => {
                let mut context = Context::new();
                context.insert("metrics", &metrics_block(features)?);
                Ok(self.tera.render(DIET_TEMPLATE_NAME, &context)?)
            }
            GenerationRequest::Report {
                features,
                classification,
            } => {
                let mut context = Context::new();
                context.insert("metrics", &metrics_block(features)?);
                context.insert("predicted_class", classification.predicted_class.label());
                context.insert("probability", &classification.probability);
                context.insert("risk_level", &classification.risk_level);
                Ok(self.tera.render(REPORT_TEMPLATE_NAME, &context)?)
            }
        }
    }
}

fn metrics_block(features: &DerivedFeatureSet) -> Result<String> {
    Ok(serde_json::to_string_pretty(features)?)
}
