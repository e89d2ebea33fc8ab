//! Integration tests for the Zentinel AI Guard Agent.
//!
//! These tests exercise the agent through its public API: configuration
//! parsing, request classification, the threat ledger, challenge generation
//! and verification, and the JSON-lines transport.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use zentinel_agent_ai_guard::catalog::CatalogDefinition;
use zentinel_agent_ai_guard::challenge::{verify, ChallengePayload, ChallengePool};
use zentinel_agent_ai_guard::config::{LedgerBackend, VerificationMode};
use zentinel_agent_ai_guard::transport::handle_line;
use zentinel_agent_ai_guard::{
    AiGuardAgent, AiGuardConfig, Challenge, ChallengeEngine, ChallengeKind, ChallengeSubmission,
    Classifier, RequestDescriptor, SignatureCatalog, ThreatLedger,
};

fn browser_request(user_agent: &str) -> RequestDescriptor {
    RequestDescriptor::new(user_agent)
        .with_header("Accept", "text/html,application/xhtml+xml,*/*;q=0.8")
        .with_header("Accept-Language", "en-US,en;q=0.9")
        .with_header("Accept-Encoding", "gzip, deflate, br")
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_default_config_is_valid() {
    let config = AiGuardConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.classifier.automation_threshold, 0.5);
    assert_eq!(config.ledger.backend, LedgerBackend::Memory);
    assert_eq!(config.challenge.verification, VerificationMode::Echo);
}

#[test]
fn test_config_from_json() {
    let json = r#"{
        "classifier": { "automation_threshold": 0.7 },
        "ledger": { "backend": "expiring", "max_clients": 500 },
        "challenge": { "verification": "sealed", "token_secret": "s3cret" }
    }"#;

    let config: AiGuardConfig = serde_json::from_str(json).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.classifier.automation_threshold, 0.7);
    assert_eq!(config.classifier.weights.known_agent, 0.8);
    assert_eq!(config.ledger.backend, LedgerBackend::Expiring);
    assert_eq!(config.ledger.max_clients, 500);
    assert_eq!(config.challenge.verification, VerificationMode::Sealed);
    assert_eq!(config.privacy.visible_prefix, 8);
}

#[test]
fn test_config_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guard.yaml");
    std::fs::write(&path, "privacy:\n  visible_prefix: 4\n  mask: \"...\"\n").unwrap();

    let config = AiGuardConfig::from_file(&path).unwrap();
    assert_eq!(config.privacy.mask_identity("192.168.0.1"), "192....");
}

#[test]
fn test_agent_rejects_invalid_config() {
    let mut config = AiGuardConfig::default();
    config.classifier.automation_threshold = 1.5;

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(AiGuardAgent::new(config, &missing, &missing).is_err());
}

#[test]
fn test_agent_loads_data_files() {
    let dir = tempfile::tempdir().unwrap();
    let signatures = dir.path().join("signatures.json");
    let puzzles = dir.path().join("puzzles.json");
    std::fs::write(
        &signatures,
        r#"{"agents": [{"identifier": "AcmeAgent", "operator": "Acme"}], "suspicious_headers": [], "behaviors": []}"#,
    )
    .unwrap();
    std::fs::write(&puzzles, r#"{"logic": [], "pattern": [], "riddle": []}"#).unwrap();

    let agent = AiGuardAgent::new(AiGuardConfig::default(), &signatures, &puzzles).unwrap();

    let report = agent.analyze_request("c", &browser_request("AcmeAgent/2.0"));
    assert!(report.classification.is_automated);
    assert!(report.classification.has_category("AcmeAgent"));

    // Python is no longer a behavior pattern in this catalog
    let report = agent.analyze_request("c", &browser_request("python-requests/2.28"));
    assert!(!report.classification.is_automated);

    let issued = agent.issue_challenge();
    assert_eq!(issued.kind, ChallengeKind::Math);
}

// =============================================================================
// Classifier Tests
// =============================================================================

#[test]
fn test_python_requests_example() {
    let classifier = Classifier::default();
    let request = RequestDescriptor::new("python-requests/2.28").with_header("host", "example.com");

    let result = classifier.classify(&request);
    assert!(result.is_automated);
    assert_eq!(result.confidence, 1.0);
    assert!(result.has_category("automation"));
}

#[test]
fn test_empty_user_agent_full_browser_headers() {
    let classifier = Classifier::default();
    let result = classifier.classify(&browser_request(""));

    assert!(!result.is_automated);
    assert_eq!(result.confidence, 0.0);
    assert!(result.categories.is_empty());
    assert!(result.reasons.is_empty());
}

#[test]
fn test_known_agents_are_automated() {
    let classifier = Classifier::default();
    for ua in [
        "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko; compatible; GPTBot/1.2; +https://openai.com/gptbot)",
        "Mozilla/5.0 (compatible; ClaudeBot/1.0; +claudebot@anthropic.com)",
        "Mozilla/5.0 (compatible; PerplexityBot/1.0)",
    ] {
        let result = classifier.classify(&browser_request(ua));
        assert!(result.is_automated, "{ua} should be automated");
        assert!(!result.categories.is_empty());
    }
}

#[test]
fn test_regular_browsers_are_human() {
    let classifier = Classifier::default();
    for ua in [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    ] {
        let result = classifier.classify(&browser_request(ua));
        assert!(!result.is_automated, "{ua} should be human");
        assert_eq!(result.confidence, 0.0);
    }
}

#[test]
fn test_sdk_headers_flag_request() {
    let classifier = Classifier::default();
    let request = browser_request("Mozilla/5.0").with_header("X-Stainless-Lang", "python");

    let result = classifier.classify(&request);
    assert!(result.is_automated);
    assert!(result.reasons.iter().any(|r| r.contains("x-stainless-lang")));
}

#[test]
fn test_confidence_bounds_and_threshold() {
    let classifier = Classifier::default();
    let requests = [
        RequestDescriptor::new(""),
        RequestDescriptor::new("curl/8.4.0"),
        browser_request("UptimeRobot/2.0 monitor"),
        browser_request("GPTBot ClaudeBot CCBot headless scraper").with_header("x-selenium", "1"),
        browser_request("Mozilla/5.0"),
    ];

    for request in &requests {
        let result = classifier.classify(request);
        assert!((0.0..=1.0).contains(&result.confidence));
        assert_eq!(result.is_automated, result.confidence > 0.5);

        let unique: HashSet<&String> = result.categories.iter().collect();
        assert_eq!(unique.len(), result.categories.len());
    }
}

#[test]
fn test_classification_is_pure() {
    let classifier = Classifier::default();
    let request = RequestDescriptor::new("Scrapy/2.11 (+https://scrapy.org)");
    assert_eq!(classifier.classify(&request), classifier.classify(&request));
}

#[test]
fn test_custom_catalog() {
    let definition = CatalogDefinition {
        agents: vec![],
        suspicious_headers: vec!["X-Internal-Bot".to_string()],
        behaviors: vec![],
    };
    let catalog = SignatureCatalog::compile(definition).unwrap();
    let classifier = Classifier::new(Arc::new(catalog), &AiGuardConfig::default().classifier);

    let result = classifier.classify(&browser_request("GPTBot").with_header("x-internal-bot", "yes"));
    assert!(result.is_automated);
    assert!(result.categories.is_empty());
}

// =============================================================================
// Threat Ledger Tests
// =============================================================================

#[test]
fn test_ledger_severities_commute() {
    let severities = [0.05, 0.3, 0.12, 0.2];

    let forward = ThreatLedger::in_memory();
    for s in severities {
        forward.record_threat("c", "e", s);
    }
    let backward = ThreatLedger::in_memory();
    for s in severities.iter().rev() {
        backward.record_threat("c", "e", *s);
    }

    let a = forward.lookup("c").unwrap().risk_score;
    let b = backward.lookup("c").unwrap().risk_score;
    assert!((a - b).abs() < 1e-9);
}

#[test]
fn test_ledger_risk_stays_in_bounds() {
    let ledger = ThreatLedger::in_memory();
    for _ in 0..20 {
        let record = ledger.record_threat("c", "ai-detected", 0.3);
        assert!(record.risk_score <= 1.0);
    }
    for _ in 0..20 {
        let record = ledger.reduce_risk("c", 0.3).unwrap();
        assert!(record.risk_score >= 0.0);
    }
    assert_eq!(ledger.lookup("c").unwrap().event_count(), 20);
}

#[test]
fn test_concurrent_clients_are_isolated() {
    let ledger = ThreatLedger::in_memory();
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let ledger = ledger.clone();
            std::thread::spawn(move || {
                let identity = format!("client-{i}");
                for _ in 0..50 {
                    ledger.record_threat(&identity, "e", 0.01);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ledger.len(), 16);
    for i in 0..16 {
        let record = ledger.lookup(&format!("client-{i}")).unwrap();
        assert_eq!(record.event_count(), 50);
        assert!((record.risk_score - 0.5).abs() < 1e-6);
    }
}

// =============================================================================
// Challenge Tests
// =============================================================================

#[test]
fn test_verify_examples() {
    assert!(verify("42", "42"));
    assert!(verify(" 42 ", "42"));
    assert!(verify("Fire", "fire"));
    assert!(!verify("56", "56.0"));
}

/// Assert that a challenge's solution is the one its payload implies.
fn assert_solution_matches_payload(pool: &ChallengePool, challenge: &Challenge) {
    match &challenge.payload {
        ChallengePayload::Arithmetic {
            left,
            operator,
            right,
            ..
        } => {
            assert_eq!(challenge.kind, ChallengeKind::Math);
            assert_eq!(challenge.expected_solution, operator.apply(*left, *right).to_string());
        }
        ChallengePayload::Sequence { sequence, .. } => {
            assert_eq!(challenge.kind, ChallengeKind::Pattern);
            let puzzle = pool
                .pattern
                .iter()
                .find(|p| &p.sequence == sequence)
                .expect("sequence comes from the pool");
            assert_eq!(challenge.expected_solution, puzzle.solution);
        }
        ChallengePayload::Question { prompt, options } => {
            let list = match challenge.kind {
                ChallengeKind::Logic => &pool.logic,
                ChallengeKind::Riddle => &pool.riddle,
                other => panic!("question payload for {:?}", other),
            };
            let puzzle = list
                .iter()
                .find(|p| &p.prompt == prompt)
                .expect("question comes from the pool");
            assert_eq!(&puzzle.options, options);
            assert_eq!(challenge.expected_solution, puzzle.solution);
        }
    }
    assert!(verify(&challenge.expected_solution.to_uppercase(), &challenge.expected_solution));
}

#[test]
fn test_seeded_challenges_match_pool() {
    let pool = ChallengePool::default();
    let engine = ChallengeEngine::new(Arc::new(pool.clone()));
    let mut rng = StdRng::seed_from_u64(2024);

    let mut kinds = HashSet::new();
    for _ in 0..1000 {
        let challenge = engine.generate_with(&mut rng);
        assert_solution_matches_payload(&pool, &challenge);
        kinds.insert(challenge.kind);
    }
    assert_eq!(kinds.len(), 4);
}

#[test]
fn test_thousand_concurrent_challenges_unique_and_solvable() {
    let pool = ChallengePool::default();
    let engine = ChallengeEngine::new(Arc::new(pool.clone()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            std::thread::spawn(move || (0..125).map(|_| engine.generate()).collect::<Vec<_>>())
        })
        .collect();

    let challenges: Vec<Challenge> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(challenges.len(), 1000);

    let ids: HashSet<_> = challenges.iter().map(|c| c.challenge_id).collect();
    assert_eq!(ids.len(), 1000);

    for challenge in &challenges {
        assert!(!challenge.payload.prompt().is_empty());
        assert_solution_matches_payload(&pool, challenge);
    }
}

#[test]
fn test_sealed_mode_end_to_end() {
    let mut config = AiGuardConfig::default();
    config.challenge.verification = VerificationMode::Sealed;
    config.challenge.token_secret = "integration-secret".to_string();
    let agent = AiGuardAgent::from_parts(
        config,
        SignatureCatalog::default(),
        ChallengePool::default(),
        ThreatLedger::in_memory(),
    );

    let issued = agent.issue_challenge_with(&mut StdRng::seed_from_u64(8));
    let seal = issued.solution.clone().unwrap();

    // The seal itself is not an answer
    let outcome = agent.verify_challenge(
        "client",
        &ChallengeSubmission {
            challenge_id: issued.challenge_id.to_string(),
            answer: Some(seal.clone()),
            expected_solution: Some(seal),
        },
    );
    assert!(!outcome.verified);
    assert_eq!(agent.threat_summary("client").event_count, 1);
}

#[test]
fn test_stored_mode_end_to_end() {
    let mut config = AiGuardConfig::default();
    config.challenge.verification = VerificationMode::Stored;
    let agent = AiGuardAgent::from_parts(
        config,
        SignatureCatalog::default(),
        ChallengePool::default(),
        ThreatLedger::in_memory(),
    );

    let issued = agent.issue_challenge();
    assert!(issued.solution.is_none());
    assert_eq!(agent.stats().outstanding_challenges, Some(1));

    let submission = ChallengeSubmission {
        challenge_id: issued.challenge_id.to_string(),
        answer: Some("wrong answer".to_string()),
        expected_solution: Some("wrong answer".to_string()),
    };
    assert!(!agent.verify_challenge("client", &submission).verified);
    assert_eq!(agent.stats().outstanding_challenges, Some(0));
}

#[test]
fn test_sealed_challenge_cannot_be_replayed() {
    let mut config = AiGuardConfig::default();
    config.challenge.verification = VerificationMode::Sealed;
    config.challenge.token_secret = "integration-secret".to_string();
    let pool = ChallengePool::default();
    let agent = AiGuardAgent::from_parts(
        config,
        SignatureCatalog::default(),
        pool.clone(),
        ThreatLedger::in_memory(),
    );
    agent.ledger().record_threat("bot", "ai-detected", 1.0);

    // Recover the solution from the seeded engine that produced the challenge
    let expected = ChallengeEngine::new(Arc::new(pool))
        .generate_with(&mut StdRng::seed_from_u64(8))
        .expected_solution;
    let issued = agent.issue_challenge_with(&mut StdRng::seed_from_u64(8));
    let submission = ChallengeSubmission {
        challenge_id: issued.challenge_id.to_string(),
        answer: Some(expected),
        expected_solution: issued.solution.clone(),
    };

    assert!(agent.verify_challenge("bot", &submission).verified);
    assert!((agent.threat_summary("bot").risk_score - 0.8).abs() < 1e-9);

    for _ in 0..4 {
        assert!(!agent.verify_challenge("bot", &submission).verified);
    }
    let summary = agent.threat_summary("bot");
    assert!(summary.risk_score >= 0.8);
    assert_eq!(summary.event_count, 5);
}

// =============================================================================
// Agent Flow Tests
// =============================================================================

#[test]
fn test_failures_then_success_adjust_risk() {
    let agent = AiGuardAgent::with_defaults();
    let wrong = ChallengeSubmission {
        challenge_id: "c".to_string(),
        answer: Some("water".to_string()),
        expected_solution: Some("fire".to_string()),
    };
    for _ in 0..5 {
        agent.verify_challenge("10.0.0.5", &wrong);
    }
    assert!((agent.threat_summary("10.0.0.5").risk_score - 0.5).abs() < 1e-9);

    let right = ChallengeSubmission {
        answer: Some("FIRE".to_string()),
        ..wrong
    };
    assert!(agent.verify_challenge("10.0.0.5", &right).verified);
    assert!((agent.threat_summary("10.0.0.5").risk_score - 0.3).abs() < 1e-9);
}

#[test]
fn test_detection_severity_is_confidence() {
    let mut config = AiGuardConfig::default();
    config.classifier.automation_threshold = 0.1;
    let agent = AiGuardAgent::from_parts(
        config,
        SignatureCatalog::default(),
        ChallengePool::default(),
        ThreatLedger::in_memory(),
    );

    // Only the research pattern fires: 0.4
    let report = agent.analyze_request("c", &browser_request("Mozilla/5.0 research-project"));
    assert!(report.classification.is_automated);
    assert!((report.classification.confidence - 0.4).abs() < 1e-9);

    let record = agent.ledger().lookup("c").unwrap();
    assert!((record.risk_score - 0.4).abs() < 1e-9);
    assert_eq!(record.threat_events, vec!["ai-detected"]);
}

#[test]
fn test_summary_does_not_create_records() {
    let agent = AiGuardAgent::with_defaults();
    let summary = agent.threat_summary("stranger");
    assert!(!summary.has_data);
    assert!(agent.ledger().is_empty());
}

// =============================================================================
// Transport Tests
// =============================================================================

#[test]
fn test_transport_challenge_flow() {
    let agent = AiGuardAgent::with_defaults();

    let issued: serde_json::Value =
        serde_json::from_str(&handle_line(&agent, r#"{"op":"issue_challenge"}"#)).unwrap();
    let data = &issued["data"];
    let id = data["challenge_id"].as_str().unwrap();
    let solution = data["solution"].as_str().unwrap();
    assert!(data["payload"]["prompt"].is_string());

    let line = serde_json::json!({
        "op": "verify_challenge",
        "client": "198.51.100.23",
        "challenge_id": id,
        "answer": solution,
        "expected_solution": solution,
    })
    .to_string();
    let verified: serde_json::Value = serde_json::from_str(&handle_line(&agent, &line)).unwrap();
    assert_eq!(verified["ok"], true);
    assert_eq!(verified["data"]["verified"], true);
}

#[test]
fn test_transport_never_leaks_identity() {
    let agent = AiGuardAgent::with_defaults();
    let identity = "2001:db8:85a3::8a2e:370:7334";

    for line in [
        serde_json::json!({"op": "analyze_request", "client": identity, "user_agent": "wget/1.21"}),
        serde_json::json!({"op": "threat_summary", "client": identity}),
    ] {
        let response = handle_line(&agent, &line.to_string());
        assert!(!response.contains(identity));
        assert!(response.contains("2001:db8***"));
    }
}

#[test]
fn test_transport_stats() {
    let agent = AiGuardAgent::with_defaults();
    handle_line(&agent, r#"{"op":"analyze_request","client":"a","user_agent":"curl/8.0"}"#);

    let stats: serde_json::Value =
        serde_json::from_str(&handle_line(&agent, r#"{"op":"stats"}"#)).unwrap();
    assert_eq!(stats["data"]["tracked_clients"], 1);
    assert_eq!(stats["data"]["ledger_backend"], "memory");
    assert_eq!(stats["data"]["verification_mode"], "echo");
}
