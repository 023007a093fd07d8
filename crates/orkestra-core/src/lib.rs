// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Orkestra model routing.
//!
//! This crate provides the error taxonomy, the shared types passed between
//! routing stages, and the capability traits that the embedder, classifier
//! and provider backends implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{OrkestraError, Stage};
pub use types::{
    Generation, GenerationRequest, ProviderKind, RoutingDecision, SelectionResult, Tier,
    TokenUsage,
};

pub use traits::{Classifier, Embedder, GenerationBackend, TextStream};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for kind in ProviderKind::ALL {
            let parsed = ProviderKind::from_name(kind.as_str()).expect("should parse back");
            assert_eq!(kind, parsed);
            assert_eq!(kind.to_string(), kind.as_str());
        }
        assert_eq!(ProviderKind::OpenAi.as_str(), "openai");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = ProviderKind::from_name("nonexistent").unwrap_err();
        assert!(matches!(err, OrkestraError::UnknownProvider(ref n) if n == "nonexistent"));
        assert_eq!(err.stage(), Stage::Configuration);
    }

    #[test]
    fn provider_kind_serialization() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).expect("should serialize");
        assert_eq!(json, "\"openai\"");
        let parsed: ProviderKind = serde_json::from_str("\"anthropic\"").expect("should parse");
        assert_eq!(parsed, ProviderKind::Anthropic);
    }

    #[test]
    fn tier_rank_is_total_order() {
        assert_eq!(Tier::Budget.rank(), 0);
        assert_eq!(Tier::Balanced.rank(), 1);
        assert_eq!(Tier::Premium.rank(), 2);
        assert!(Tier::Budget < Tier::Balanced && Tier::Balanced < Tier::Premium);
    }

    #[test]
    fn tier_rejects_unknown_names() {
        assert_eq!("balanced".parse::<Tier>().unwrap(), Tier::Balanced);
        assert!("ultra".parse::<Tier>().is_err());
        assert!(serde_json::from_str::<Tier>("\"ultra\"").is_err());
    }

    #[test]
    fn errors_report_their_stage() {
        let cases = [
            (OrkestraError::UnknownStrategy("fastest".into()), Stage::Selection),
            (OrkestraError::NoCandidates, Stage::Selection),
            (
                OrkestraError::UnknownModel {
                    provider: "google".into(),
                    model: "x".into(),
                },
                Stage::Configuration,
            ),
            (
                OrkestraError::ArtifactNotFound {
                    provider: "google".into(),
                    attempts: vec![],
                },
                Stage::ArtifactResolution,
            ),
            (
                OrkestraError::ChecksumMismatch {
                    filename: "router-google.json".into(),
                    expected: "aa".into(),
                    actual: "bb".into(),
                },
                Stage::ArtifactResolution,
            ),
            (
                OrkestraError::Classification {
                    provider: "google".into(),
                    message: "dimension".into(),
                },
                Stage::Classification,
            ),
            (
                OrkestraError::ModelUnavailable {
                    message: "missing".into(),
                    source: None,
                },
                Stage::Embedding,
            ),
            (
                OrkestraError::Backend {
                    provider: "openai".into(),
                    message: "429".into(),
                    source: None,
                },
                Stage::Backend,
            ),
        ];
        for (err, stage) in cases {
            assert_eq!(err.stage(), stage, "{err}");
        }
    }

    #[test]
    fn artifact_not_found_lists_attempts() {
        let err = OrkestraError::ArtifactNotFound {
            provider: "google".into(),
            attempts: vec!["cache: missing".into(), "remote: timeout".into()],
        };
        assert_eq!(
            err.to_string(),
            "router artifact for `google` not found: cache: missing; remote: timeout"
        );
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_embedder<T: Embedder>() {}
        fn _assert_classifier<T: Classifier>() {}
        fn _assert_backend<T: GenerationBackend>() {}
    }
}
