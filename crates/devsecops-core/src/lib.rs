//! # DevSecOps Core
//!
//! Shared data models for the pipeline builder and threat modeler:
//! pipeline stages, tool categories, ordinal risk levels, STRIDE categories,
//! typed model errors, id generation and YAML-style document rendering.

pub mod document;
pub mod error;
pub mod ids;
pub mod model;

pub use document::*;
pub use error::*;
pub use ids::*;
pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(test)]
    mod stage_tests {
        use super::*;

        #[test]
        fn test_stage_order_and_count() {
            assert_eq!(Stage::COUNT, 8);
            assert_eq!(Stage::ALL[0], Stage::Plan);
            assert_eq!(Stage::ALL[7], Stage::Feedback);
            assert!(Stage::Build < Stage::Test);
        }

        #[test]
        fn test_stage_from_str() {
            assert_eq!("build".parse::<Stage>().unwrap(), Stage::Build);
            assert_eq!(" Deploy ".parse::<Stage>().unwrap(), Stage::Deploy);

            let err = "staging".parse::<Stage>().unwrap_err();
            assert_eq!(err, ModelError::UnknownStage { stage: "staging".to_string() });
        }

        #[test]
        fn test_stage_serde_lowercase() {
            let json = serde_json::to_string(&Stage::Monitor).unwrap();
            assert_eq!(json, "\"monitor\"");
            let stage: Stage = serde_json::from_str("\"release\"").unwrap();
            assert_eq!(stage, Stage::Release);
        }

        #[test]
        fn test_stage_display_name() {
            assert_eq!(Stage::Feedback.display_name(), "Feedback");
            assert_eq!(Stage::Code.to_string(), "code");
        }
    }

    #[cfg(test)]
    mod level_tests {
        use super::*;

        #[test]
        fn test_level_scores() {
            let scores: Vec<u32> = Level::ALL.iter().map(|l| l.score()).collect();
            assert_eq!(scores, vec![1, 2, 3, 4, 5]);
        }

        #[test]
        fn test_level_ordering() {
            assert!(Level::Info < Level::Low);
            assert!(Level::High < Level::Critical);
        }

        #[test]
        fn test_level_parse_rejects_unknown() {
            assert_eq!("HIGH".parse::<Level>().unwrap(), Level::High);
            assert!(matches!("severe".parse::<Level>(), Err(ModelError::InvalidValue { .. })));
        }

        #[test]
        fn test_risk_bucket_boundaries() {
            assert_eq!(RiskBucket::from_product(25), RiskBucket::Critical);
            assert_eq!(RiskBucket::from_product(20), RiskBucket::Critical);
            assert_eq!(RiskBucket::from_product(19), RiskBucket::High);
            assert_eq!(RiskBucket::from_product(12), RiskBucket::High);
            assert_eq!(RiskBucket::from_product(11), RiskBucket::Medium);
            assert_eq!(RiskBucket::from_product(6), RiskBucket::Medium);
            assert_eq!(RiskBucket::from_product(5), RiskBucket::Low);
            assert_eq!(RiskBucket::from_product(1), RiskBucket::Low);
        }
    }

    #[cfg(test)]
    mod category_tests {
        use super::*;

        #[test]
        fn test_stride_aliases() {
            let dos: StrideCategory = serde_json::from_str("\"dos\"").unwrap();
            assert_eq!(dos, StrideCategory::DenialOfService);
            let elevation: StrideCategory = serde_json::from_str("\"elevation\"").unwrap();
            assert_eq!(elevation, StrideCategory::ElevationOfPrivilege);
            let disclosure: StrideCategory = serde_json::from_str("\"information-disclosure\"").unwrap();
            assert_eq!(disclosure.display_name(), "Information Disclosure");
        }

        #[test]
        fn test_tool_category_aliases() {
            let sast: ToolCategory = serde_json::from_str("\"sast\"").unwrap();
            assert_eq!(sast, ToolCategory::StaticAnalysis);
            assert_eq!(serde_json::to_string(&ToolCategory::ContainerScan).unwrap(), "\"container-scan\"");
        }
    }

    #[cfg(test)]
    mod config_value_tests {
        use super::*;

        #[test]
        fn test_form_input_checkbox() {
            assert_eq!(ConfigValue::from_form_input("on"), ConfigValue::Bool(true));
        }

        #[test]
        fn test_form_input_list() {
            assert_eq!(
                ConfigValue::from_form_input("CRITICAL,HIGH"),
                ConfigValue::List(vec!["CRITICAL".to_string(), "HIGH".to_string()])
            );
        }

        #[test]
        fn test_form_input_text() {
            assert_eq!(ConfigValue::from_form_input("full"), ConfigValue::Text("full".to_string()));
        }

        #[test]
        fn test_untagged_serde() {
            let config: ToolConfig =
                serde_json::from_str(r#"{"failOnHigh": true, "scanType": "full", "hooks": ["a", "b"]}"#).unwrap();
            assert_eq!(config["failOnHigh"], ConfigValue::Bool(true));
            assert_eq!(config["scanType"], ConfigValue::Text("full".to_string()));
            assert_eq!(config["hooks"].to_string(), "a,b");
        }

        #[test]
        fn test_format_config_key() {
            assert_eq!(format_config_key("failOnHigh"), "Fail On High");
            assert_eq!(format_config_key("qualityGate"), "Quality Gate");
            assert_eq!(format_config_key("hooks"), "Hooks");
            assert_eq!(format_config_key(""), "");
        }
    }

    #[cfg(test)]
    mod id_tests {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn test_sequential_ids_unique_across_prefixes() {
            let mut ids = SequentialIdGenerator::new();
            assert_eq!(ids.next_id("comp"), "comp_1");
            assert_eq!(ids.next_id("threat"), "threat_2");
            assert_eq!(ids.next_id("comp"), "comp_3");
        }

        #[test]
        fn test_sequential_starting_at() {
            let mut ids = SequentialIdGenerator::starting_at(41);
            assert_eq!(ids.next_id("comp"), "comp_42");
        }

        #[cfg(feature = "uuid")]
        #[test]
        fn test_uuid_ids_unique() {
            let mut ids = UuidIdGenerator;
            let generated: HashSet<String> = (0..100).map(|_| ids.next_id("threat")).collect();
            assert_eq!(generated.len(), 100);
            assert!(generated.iter().all(|id| id.starts_with("threat_")));
        }
    }

    #[cfg(test)]
    mod document_tests {
        use super::*;

        #[test]
        fn test_scalar_rendering() {
            let doc = Mapping::new()
                .with("name", Node::text("DevSecOps Pipeline"))
                .with("enabled", Node::Bool(true))
                .with("retries", Node::Int(3));
            assert_eq!(doc.to_yaml(), "name: DevSecOps Pipeline\nenabled: true\nretries: 3\n");
        }

        #[test]
        fn test_nested_mapping_indent() {
            let doc = Mapping::new().with(
                "on",
                Mapping::new().with(
                    "push",
                    Mapping::new().with("branches", Node::List(vec![Node::text("main")])),
                ),
            );
            assert_eq!(doc.to_yaml(), "on:\n  push:\n    branches:\n      - main\n");
        }

        #[test]
        fn test_list_of_mappings() {
            let step = Mapping::new()
                .with("name", Node::text("Checkout code"))
                .with("uses", Node::text("actions/checkout@v3"));
            let doc = Mapping::new().with("steps", Node::List(vec![Node::Map(step)]));
            assert_eq!(
                doc.to_yaml(),
                "steps:\n  - name: Checkout code\n    uses: actions/checkout@v3\n"
            );
        }

        #[test]
        fn test_ambiguous_text_is_quoted() {
            let doc = Mapping::new()
                .with("a", Node::text("true"))
                .with("b", Node::text("3.5"))
                .with("c", Node::text("key: value"))
                .with("d", Node::text(""));
            assert_eq!(doc.to_yaml(), "a: \"true\"\nb: \"3.5\"\nc: \"key: value\"\nd: \"\"\n");
        }

        #[test]
        fn test_radix_and_special_float_text_stays_text() {
            for text in ["0x10", "0o17", "0b101", "+0x1F", ".inf", "-.Inf", ".NaN", "1e3"] {
                let yaml = Mapping::new().with("v", Node::text(text)).to_yaml();
                assert_ne!(yaml, format!("v: {}\n", text));

                let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
                assert_eq!(parsed["v"].as_str(), Some(text));
            }

            let doc = Mapping::new().with("a", Node::text("0xZZ")).with("b", Node::text("infra"));
            assert_eq!(doc.to_yaml(), "a: 0xZZ\nb: infra\n");
        }

        #[test]
        fn test_insert_replaces_in_place() {
            let mut doc = Mapping::new().with("first", Node::Int(1)).with("second", Node::Int(2));
            doc.insert("first", Node::Int(10));
            let keys: Vec<&str> = doc.keys().collect();
            assert_eq!(keys, vec!["first", "second"]);
            assert_eq!(doc.get("first"), Some(&Node::Int(10)));
        }

        #[test]
        fn test_empty_collections() {
            let doc = Mapping::new()
                .with("with", Mapping::new())
                .with("tools", Node::List(vec![]));
            assert_eq!(doc.to_yaml(), "with: {}\ntools: []\n");
        }

        #[test]
        fn test_rendered_yaml_parses() {
            let step = Mapping::new()
                .with("name", Node::text("Run Trivy"))
                .with("uses", Node::text("aquasecurity/trivy-action@master"))
                .with(
                    "with",
                    Mapping::new()
                        .with("severity", Node::text("CRITICAL,HIGH"))
                        .with("hooks", Node::List(vec![Node::text("secret-detection"), Node::text("sast-basic")])),
                );
            let doc = Mapping::new().with(
                "jobs",
                Mapping::new().with("build-security", Mapping::new().with("steps", Node::List(vec![Node::Map(step)]))),
            );

            let parsed: serde_yaml::Value = serde_yaml::from_str(&doc.to_yaml()).unwrap();
            let step = &parsed["jobs"]["build-security"]["steps"][0];
            assert_eq!(step["uses"].as_str(), Some("aquasecurity/trivy-action@master"));
            assert_eq!(step["with"]["hooks"][1].as_str(), Some("sast-basic"));
        }

        #[test]
        fn test_json_serialization_preserves_order() {
            let doc = Mapping::new().with("z", Node::Int(1)).with("a", Node::Int(2));
            assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"z":1,"a":2}"#);
        }
    }
}
