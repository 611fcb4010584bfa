mod helpers;

use gauss::providers::ProviderRegistry;
use gauss::{ConfigError, GaussError};
use helpers::{MODEL, PROVIDER, Recorder, scripted_registry};

#[test]
fn given_known_pair_when_resolving_then_client_is_built_with_model_and_key() {
    let recorder = Recorder::default();
    let registry = scripted_registry(&recorder);

    let client = registry.resolve(PROVIDER, MODEL, " secret ").unwrap();

    assert_eq!(client.model(), MODEL);
    assert_eq!(
        recorder.constructed(),
        [(MODEL.to_string(), "secret".to_string())]
    );
}

#[test]
fn given_unlisted_model_when_resolving_then_unknown_model_and_nothing_constructed() {
    let recorder = Recorder::default();
    let registry = scripted_registry(&recorder);

    let result = registry.resolve(PROVIDER, "nonexistent-model", "k");

    assert!(matches!(
        result,
        Err(GaussError::Config(ConfigError::UnknownModel { ref provider, ref model }))
            if provider == PROVIDER && model == "nonexistent-model"
    ));
    assert!(recorder.constructed().is_empty());
}

#[test]
fn given_unlisted_provider_when_resolving_then_unknown_provider() {
    let recorder = Recorder::default();
    let registry = scripted_registry(&recorder);

    let result = registry.resolve("ProviderB", MODEL, "k");

    assert!(matches!(
        result,
        Err(GaussError::Config(ConfigError::UnknownProvider(ref name))) if name == "ProviderB"
    ));
    assert!(recorder.constructed().is_empty());
}

#[test]
fn given_blank_credential_when_resolving_then_missing_credential() {
    let recorder = Recorder::default();
    let registry = scripted_registry(&recorder);

    let result = registry.resolve(PROVIDER, MODEL, "");

    assert!(matches!(
        result,
        Err(GaussError::Config(ConfigError::MissingCredential(_)))
    ));
    assert!(recorder.constructed().is_empty());
}

#[test]
fn given_differently_cased_provider_when_resolving_then_same_entry_is_used() {
    let recorder = Recorder::default();
    let registry = scripted_registry(&recorder);

    assert!(registry.resolve("providera", MODEL, "k").is_ok());
    assert!(matches!(
        registry.resolve(PROVIDER, "MODEL-X", "k"),
        Err(GaussError::Config(ConfigError::UnknownModel { .. }))
    ));
}

#[test]
fn given_builtin_table_when_listing_then_groq_and_openai_models_are_present() {
    let registry = ProviderRegistry::builtin();

    let groq = registry.spec("Groq").unwrap();
    assert!(groq.supports("llama-3.1-70b-versatile"));
    assert!(groq.supports("gemma2-9b-it"));
    assert_eq!(groq.env_key.as_deref(), Some("GROQ_API_KEY"));

    let openai = registry.validate("OpenAI", "gpt-4o").unwrap();
    assert!(openai.supports("o1-mini"));
    assert!(!openai.supports("llama-3.1-70b-versatile"));
}

#[test]
fn given_builtin_provider_when_resolving_then_client_builds_without_network() {
    let registry = ProviderRegistry::builtin().with_base_url("groq", "http://127.0.0.1:9/v1");

    let client = registry.resolve("Groq", "mixtral-8x7b-32768", "gsk-test").unwrap();

    assert_eq!(client.model(), "mixtral-8x7b-32768");
}
