// SPDX-FileCopyrightText: 2026 Orkestra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for routing, selection, costing and the facades.
//!
//! Each test builds an isolated context over temp directories, a keyword
//! stub embedder and mock backends. Tests are independent and
//! order-insensitive.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use orkestra::{
    ChatOptions, ModelSelection, Orkestra, OrkestraConfig, OrkestraError, ProviderKind,
    RoutingDecision, Stage,
};
use orkestra_core::GenerationBackend;
use orkestra_registry::Catalog;
use orkestra_router::{ArtifactEntry, ArtifactManifest, ArtifactStore, FetchPolicy, Fetcher};
use orkestra_test_utils::fixtures::tiered_artifact;
use orkestra_test_utils::{ArtifactFixture, MockBackend, StubEmbedder};
use tempfile::TempDir;

struct TestContext {
    context: Arc<Orkestra>,
    embedder: StubEmbedder,
    cache: TempDir,
    fixture: ArtifactFixture,
}

fn local_manifest() -> ArtifactManifest {
    ProviderKind::ALL
        .into_iter()
        .fold(ArtifactManifest::new(), |manifest, provider| {
            manifest.with(
                provider,
                ArtifactEntry {
                    url: String::new(),
                    sha256: None,
                    filename: ArtifactFixture::filename(provider),
                    version: "0.2.0".into(),
                },
            )
        })
}

fn fetcher() -> Fetcher {
    Fetcher::new(FetchPolicy {
        timeout: Duration::from_secs(5),
        retries: 0,
        backoff: Duration::from_millis(1),
    })
    .unwrap()
}

fn build(
    fixture: ArtifactFixture,
    manifest: ArtifactManifest,
    config: OrkestraConfig,
) -> TestContext {
    let cache = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(
        cache.path().to_path_buf(),
        Some(fixture.path().to_path_buf()),
        manifest,
        fetcher(),
    );
    let embedder = StubEmbedder::tiered();
    let context = Arc::new(Orkestra::from_parts(
        config,
        Catalog::builtin(),
        Arc::new(embedder.clone()),
        store,
    ));
    TestContext {
        context,
        embedder,
        cache,
        fixture,
    }
}

fn test_context() -> TestContext {
    build(ArtifactFixture::builtin(), local_manifest(), OrkestraConfig::default())
}

/// A mock backend plus a shared handle to hand to a facade.
fn backend(provider: ProviderKind) -> (MockBackend, Arc<dyn GenerationBackend>) {
    let mock = MockBackend::new(provider);
    let shared: Arc<dyn GenerationBackend> = Arc::new(mock.clone());
    (mock, shared)
}

fn all_backends() -> (Vec<MockBackend>, Vec<Arc<dyn GenerationBackend>>) {
    ProviderKind::ALL.into_iter().map(backend).unzip()
}

// ---- Routing ----

#[tokio::test]
async fn routes_each_tier_per_provider() {
    let ctx = test_context();
    let cases = [
        ("hi there", ["gemini-2.5-flash-lite", "claude-haiku-4", "gpt-4o-mini"]),
        (
            "summarize this memo",
            ["gemini-3-flash-preview", "claude-sonnet-4-5", "gpt-4o"],
        ),
        ("prove the theorem", ["gemini-3-pro-preview", "claude-opus-4", "o3"]),
    ];
    for (prompt, expected) in cases {
        for (provider, model) in ProviderKind::ALL.into_iter().zip(expected) {
            let routed = ctx.context.route(provider, prompt).await.unwrap();
            assert_eq!(routed, model, "{prompt}");
        }
    }
}

#[tokio::test]
async fn routing_is_idempotent() {
    let ctx = test_context();
    let prompt = "Explain the difference between TCP and UDP";
    let first = ctx.context.route(ProviderKind::OpenAi, prompt).await.unwrap();
    let second = ctx.context.route(ProviderKind::OpenAi, prompt).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn artifact_is_cached_and_router_held_in_memory() {
    let ctx = test_context();
    ctx.context.route(ProviderKind::Google, "hi").await.unwrap();

    let cached = ctx.cache.path().join("router-google.json");
    assert!(cached.exists(), "fallback copy should land in the cache");

    // With every source gone, the loaded router keeps serving.
    std::fs::remove_file(&cached).unwrap();
    std::fs::remove_file(ctx.fixture.path().join("router-google.json")).unwrap();
    assert_eq!(
        ctx.context.route(ProviderKind::Google, "prove it").await.unwrap(),
        "gemini-3-pro-preview"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_routing_shares_one_router() {
    let ctx = test_context();
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let context = Arc::clone(&ctx.context);
            tokio::spawn(async move {
                let prompt = if i % 2 == 0 { "hi" } else { "prove" };
                context.route(ProviderKind::Anthropic, prompt).await
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let model = handle.await.unwrap().unwrap();
        let expected = if i % 2 == 0 { "claude-haiku-4" } else { "claude-opus-4" };
        assert_eq!(model, expected);
    }
    let first = ctx.context.router(ProviderKind::Anthropic).await.unwrap();
    let second = ctx.context.router(ProviderKind::Anthropic).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn route_all_keeps_provider_order() {
    let ctx = test_context();
    let providers = [ProviderKind::OpenAi, ProviderKind::Google];
    let decisions = ctx.context.route_all(&providers, "hi").await.unwrap();
    assert_eq!(
        decisions,
        vec![
            RoutingDecision::new(ProviderKind::OpenAi, "gpt-4o-mini"),
            RoutingDecision::new(ProviderKind::Google, "gemini-2.5-flash-lite"),
        ]
    );
}

#[tokio::test]
async fn artifact_labels_outside_catalog_are_rejected() {
    let fixture = ArtifactFixture::builtin();
    fixture.write(&tiered_artifact(
        ProviderKind::OpenAi,
        ["gpt-4o-mini", "gpt-4o", "gpt-9"],
    ));
    let ctx = build(fixture, local_manifest(), OrkestraConfig::default());

    let err = ctx.context.route(ProviderKind::OpenAi, "hi").await.unwrap_err();
    assert!(matches!(err, OrkestraError::InvalidArtifact { .. }), "{err}");
    assert!(err.to_string().contains("gpt-9"));
    assert_eq!(err.stage(), Stage::ArtifactResolution);
}

#[tokio::test]
async fn missing_artifact_reports_every_source() {
    let ctx = build(ArtifactFixture::new(), local_manifest(), OrkestraConfig::default());
    let err = ctx.context.route(ProviderKind::Google, "hi").await.unwrap_err();
    match err {
        OrkestraError::ArtifactNotFound { attempts, .. } => assert_eq!(attempts.len(), 3),
        other => panic!("expected ArtifactNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn verified_remote_artifact_is_downloaded_once() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let source = ArtifactFixture::new();
    let (artifact_path, sha) = source.write(&tiered_artifact(
        ProviderKind::Google,
        ["gemini-2.5-flash-lite", "gemini-3-flash-preview", "gemini-3-pro-preview"],
    ));
    let body = std::fs::read(&artifact_path).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/routers/router-google.json"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&server)
        .await;

    let manifest = local_manifest().with(
        ProviderKind::Google,
        ArtifactEntry {
            url: format!("{}/routers/router-google.json", server.uri()),
            sha256: Some(sha),
            filename: "router-google.json".into(),
            version: "0.2.0".into(),
        },
    );
    let ctx = build(ArtifactFixture::new(), manifest, OrkestraConfig::default());

    assert_eq!(
        ctx.context.route(ProviderKind::Google, "summarize").await.unwrap(),
        "gemini-3-flash-preview"
    );
    assert!(ctx.cache.path().join("router-google.json").exists());
}

// ---- Selection and cost ----

#[tokio::test]
async fn select_examples() {
    let ctx = test_context();
    let cheap = ctx
        .context
        .select(
            "cheapest",
            &[
                RoutingDecision::new(ProviderKind::Google, "gemini-2.5-flash-lite"),
                RoutingDecision::new(ProviderKind::OpenAi, "gpt-4o-mini"),
            ],
        )
        .unwrap();
    assert_eq!(cheap.provider, ProviderKind::Google);
    assert_eq!(cheap.model, "gemini-2.5-flash-lite");

    let smart = ctx
        .context
        .select(
            "smartest",
            &[
                RoutingDecision::new(ProviderKind::Google, "gemini-3-pro-preview"),
                RoutingDecision::new(ProviderKind::OpenAi, "gpt-4o-mini"),
            ],
        )
        .unwrap();
    assert_eq!(smart.provider, ProviderKind::Google);

    let err = ctx.context.select("fastest", &[]).unwrap_err();
    assert!(matches!(err, OrkestraError::UnknownStrategy(ref s) if s == "fastest"));
    assert_eq!(err.stage(), Stage::Selection);
}

#[tokio::test]
async fn select_rejects_two_decisions_for_one_provider() {
    let ctx = test_context();
    let err = ctx
        .context
        .select(
            "cheapest",
            &[
                RoutingDecision::new(ProviderKind::Google, "gemini-3-pro-preview"),
                RoutingDecision::new(ProviderKind::Google, "gemini-2.5-flash-lite"),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, OrkestraError::Config(_)), "got: {err}");
    assert_eq!(err.stage(), Stage::Configuration);
}

#[test]
fn cost_example_and_errors() {
    let ctx = test_context();
    let cost = ctx.context.cost("google", "gemini-2.5-flash-lite", 500, 1000).unwrap();
    assert!((cost - 0.00045).abs() < 1e-12);
    assert_eq!(ctx.context.cost("google", "gemini-3-pro-preview", 0, 0).unwrap(), 0.0);

    assert!(matches!(
        ctx.context.cost("mistral", "large", 1, 1).unwrap_err(),
        OrkestraError::UnknownProvider(_)
    ));
    assert!(matches!(
        ctx.context.cost("google", "gpt-4o", 1, 1).unwrap_err(),
        OrkestraError::UnknownModel { .. }
    ));
}

#[test]
fn manifest_includes_artifacts() {
    let ctx = test_context();
    let manifest = ctx.context.manifest();
    for provider in ProviderKind::ALL {
        let entry = manifest.provider(provider).unwrap();
        let artifact = entry.artifact.as_ref().unwrap();
        assert_eq!(artifact.filename, ArtifactFixture::filename(provider));
        assert_eq!(artifact.version, "0.2.0");
    }
}

// ---- Single provider ----

#[tokio::test]
async fn smart_provider_routes_calls_and_costs() {
    let ctx = test_context();
    let (mock, backend) = backend(ProviderKind::Google);
    mock.add_response("cheap answer").await;
    let provider = ctx.context.provider(backend, ModelSelection::Smart).unwrap();

    let response = provider.chat("hi", &ChatOptions::default()).await.unwrap();
    assert_eq!(response.text, "cheap answer");
    assert_eq!(response.model, "gemini-2.5-flash-lite");
    assert_eq!(response.base_model, "gemini-3-pro-preview");
    assert_eq!(response.input_tokens, 10);
    assert_eq!(response.output_tokens, 20);
    let expected = (10.0 * 0.10 + 20.0 * 0.40) / 1e6;
    assert!((response.cost - expected).abs() < 1e-15);
    let base = (10.0 * 2.00 + 20.0 * 12.00) / 1e6;
    assert!((response.savings - (base - expected)).abs() < 1e-15);
    assert!(response.savings_percent > 90.0);

    let requests = mock.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, 8192);
    assert_eq!(requests[0].temperature, 1.0);
}

#[tokio::test]
async fn premium_route_has_no_savings() {
    let ctx = test_context();
    let (_mock, backend) = backend(ProviderKind::Google);
    let provider = ctx.context.provider(backend, ModelSelection::Smart).unwrap();
    let response = provider.chat("prove it", &ChatOptions::default()).await.unwrap();
    assert_eq!(response.model, "gemini-3-pro-preview");
    assert_eq!(response.savings, 0.0);
    assert_eq!(response.savings_percent, 0.0);
}

#[tokio::test]
async fn smart_mode_ignores_model_override() {
    let ctx = test_context();
    let (mock, backend) = backend(ProviderKind::OpenAi);
    let provider = ctx.context.provider(backend, ModelSelection::Smart).unwrap();
    let options = ChatOptions::default().model("o3").max_tokens(64).temperature(0.2);
    provider.chat("hi", &options).await.unwrap();

    let requests = mock.requests().await;
    assert_eq!(requests[0].model, "gpt-4o-mini");
    assert_eq!(requests[0].max_tokens, 64);
    assert_eq!(requests[0].temperature, 0.2);
}

#[tokio::test]
async fn fixed_mode_uses_fallback_and_overrides_without_routing() {
    let ctx = test_context();
    let (mock, backend) = backend(ProviderKind::Anthropic);
    let provider = ctx.context.provider(backend, ModelSelection::Fixed(None)).unwrap();

    provider.chat("prove it", &ChatOptions::default()).await.unwrap();
    provider
        .chat("hi", &ChatOptions::default().model("claude-opus-4"))
        .await
        .unwrap();

    assert_eq!(
        mock.called_models().await,
        vec!["claude-sonnet-4-5", "claude-opus-4"]
    );
    assert_eq!(ctx.embedder.calls(), 0);
}

#[tokio::test]
async fn fixed_mode_rejects_empty_and_unknown_models() {
    let ctx = test_context();
    let (_mock, backend) = backend(ProviderKind::Google);

    let err = ctx
        .context
        .provider(Arc::clone(&backend), ModelSelection::Fixed(Some(String::new())))
        .err()
        .unwrap();
    assert!(matches!(err, OrkestraError::Config(_)));

    let err = ctx
        .context
        .provider(Arc::clone(&backend), ModelSelection::Fixed(Some("gpt-4o".into())))
        .err()
        .unwrap();
    assert!(matches!(err, OrkestraError::UnknownModel { .. }));

    let provider = ctx
        .context
        .provider(backend, ModelSelection::Fixed(Some("gemini-2.5-flash-lite".into())))
        .unwrap();
    let err = provider
        .chat("hi", &ChatOptions::default().model(""))
        .await
        .unwrap_err();
    assert!(matches!(err, OrkestraError::Config(_)));
}

#[tokio::test]
async fn default_provider_follows_smart_routing_flag() {
    let mut config = OrkestraConfig::default();
    config.routing.smart_routing = false;
    let ctx = build(ArtifactFixture::builtin(), local_manifest(), config);
    let (_mock, backend) = backend(ProviderKind::OpenAi);
    let provider = ctx.context.default_provider(backend).unwrap();
    assert_eq!(provider.selection(), &ModelSelection::Fixed(Some("gpt-4o".into())));
}

#[tokio::test]
async fn stream_text_yields_fragments_from_routed_model() {
    let ctx = test_context();
    let (mock, backend) = backend(ProviderKind::Google);
    mock.add_response("one two three").await;
    let provider = ctx.context.provider(backend, ModelSelection::Smart).unwrap();

    let stream = provider
        .stream_text("summarize", &ChatOptions::default())
        .await
        .unwrap();
    let text: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
    assert_eq!(text.concat(), "one two three");
    assert_eq!(mock.called_models().await, vec!["gemini-3-flash-preview"]);
}

#[tokio::test]
async fn backend_failure_reports_backend_stage() {
    let ctx = test_context();
    let (mock, backend) = backend(ProviderKind::Google);
    mock.add_failure("503 upstream").await;
    let provider = ctx.context.provider(backend, ModelSelection::Smart).unwrap();
    let err = provider.chat("hi", &ChatOptions::default()).await.unwrap_err();
    assert_eq!(err.stage(), Stage::Backend);
}

// ---- Multiple providers ----

#[tokio::test]
async fn multi_cheapest_calls_only_the_winner() {
    let ctx = test_context();
    let (mocks, backends) = all_backends();
    let multi = ctx.context.multi(backends).unwrap();

    let response = multi
        .chat("hi", Some("cheapest"), &ChatOptions::default())
        .await
        .unwrap();
    assert_eq!(response.provider, ProviderKind::Google);
    assert_eq!(response.model, "gemini-2.5-flash-lite");
    assert_eq!(response.savings, 0.0);
    assert_eq!(response.base_model, response.model);
    assert_eq!(response.base_cost, response.cost);

    assert_eq!(mocks[0].requests().await.len(), 1);
    assert!(mocks[1].requests().await.is_empty());
    assert!(mocks[2].requests().await.is_empty());
}

#[tokio::test]
async fn multi_smartest_and_balanced() {
    let ctx = test_context();
    let (_mocks, backends) = all_backends();
    let multi = ctx.context.multi(backends).unwrap();

    // All premium; cheapest premium wins.
    let smart = multi.choose("prove", Some("smartest")).await.unwrap();
    assert_eq!(smart.provider, ProviderKind::Google);
    assert_eq!(smart.model, "gemini-3-pro-preview");

    let balanced = multi.choose("summarize", Some("balanced")).await.unwrap();
    assert_eq!(balanced.provider, ProviderKind::Google);
    assert_eq!(balanced.model, "gemini-3-flash-preview");

    // No balanced candidates: cheapest overall.
    let fallback = multi.choose("hi", Some("balanced")).await.unwrap();
    assert_eq!(fallback.model, "gemini-2.5-flash-lite");
}

#[tokio::test]
async fn multi_uses_configured_default_strategy() {
    let mut config = OrkestraConfig::default();
    config.routing.default_strategy = "smartest".into();
    let ctx = build(ArtifactFixture::builtin(), local_manifest(), config);
    let (_mocks, backends) = all_backends();
    let multi = ctx.context.multi(backends).unwrap();

    let chosen = multi.choose("hi", None).await.unwrap();
    // Every candidate is budget tier; the cheapest budget model wins.
    assert_eq!(chosen.model, "gemini-2.5-flash-lite");
}

#[tokio::test]
async fn unknown_strategy_fails_before_routing() {
    let ctx = test_context();
    let (mocks, backends) = all_backends();
    let multi = ctx.context.multi(backends).unwrap();

    let err = multi
        .chat("hi", Some("fastest"), &ChatOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrkestraError::UnknownStrategy(_)));
    assert_eq!(ctx.embedder.calls(), 0);
    for mock in mocks {
        assert!(mock.requests().await.is_empty());
    }
}

#[tokio::test]
async fn multi_streams_from_winner() {
    let ctx = test_context();
    let (mocks, backends) = all_backends();
    mocks[2].add_response("from openai").await;
    let providers = vec![Arc::clone(&backends[2]), Arc::clone(&backends[1])];
    let multi = ctx.context.multi(providers).unwrap();

    let stream = multi
        .stream_text("hi", Some("cheapest"), &ChatOptions::default())
        .await
        .unwrap();
    let text: Vec<String> = stream.map(|f| f.unwrap()).collect().await;
    assert_eq!(text.concat(), "from openai");
    assert_eq!(mocks[2].called_models().await, vec!["gpt-4o-mini"]);
}

#[test]
fn multi_rejects_empty_and_duplicate_providers() {
    let ctx = test_context();
    assert!(matches!(
        ctx.context.multi(Vec::new()).err().unwrap(),
        OrkestraError::Config(_)
    ));

    let (_a, first) = backend(ProviderKind::Google);
    let (_b, second) = backend(ProviderKind::Google);
    let err = ctx.context.multi(vec![first, second]).err().unwrap();
    assert!(err.to_string().contains("more than once"), "{err}");
}

#[tokio::test]
async fn prefetch_resolves_every_artifact() {
    let ctx = test_context();
    let resolved = ctx.context.prefetch().await.unwrap();
    assert_eq!(resolved.len(), 3);
    for (provider, path) in resolved {
        assert!(path.starts_with(ctx.cache.path()));
        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(ArtifactFixture::filename(provider).as_str())
        );
        assert!(Path::new(&path).exists());
    }
}
