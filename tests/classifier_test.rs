//! End-to-end classification scenarios against real files on disk.

use scribe::analysis::{Category, Classifier};

#[test]
fn test_documentation_only_change() {
    let diff = "diff --git a/docs/guide.md b/docs/guide.md\n\
                +# Guide\n\
                +How to install and run the tool.\n";
    let c = Classifier::new().classify(diff, &[], &["docs/guide.md".to_string()]);

    assert_eq!(c.category, Category::Docs);
    assert!(c.confidence >= 0.7, "confidence was {}", c.confidence);
}

#[test]
fn test_authentication_change_with_real_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("auth")).unwrap();
    std::fs::write(
        dir.path().join("auth/login.py"),
        "def login(user):\n    pass\n",
    )
    .unwrap();

    let diff = "diff --git a/auth/login.py b/auth/login.py\n\
                +def create_session(user):\n\
                +    token = jwt.encode(user.id)\n\
                +    return token\n";
    let staged = vec!["auth/login.py".to_string()];
    let c = Classifier::with_root(dir.path()).classify(diff, &staged, &[]);

    assert!(
        matches!(c.category, Category::Feat | Category::Security),
        "got {}",
        c.category
    );
    assert!(c.idioms.contains("authentication"));
    assert_eq!(c.scope, "(auth)");
    assert!(c.languages.contains("python"));
    assert!(c.identifiers.functions.contains(&"create_session".to_string()));
}

#[test]
fn test_mass_removal_across_files() {
    let mut diff = String::from("+kept one line\n");
    for i in 0..12 {
        diff.push_str(&format!("-legacy_{i} = None\n"));
    }
    let staged: Vec<String> = (0..5).map(|i| format!("legacy_{i}.cfgx")).collect();

    let c = Classifier::new().classify(&diff, &staged, &[]);
    assert_eq!(c.category, Category::Remove);
}

#[test]
fn test_classification_is_stable_across_runs() {
    let diff = "+def handler(request):\n+    validate(request)\n-old_handler = None\n";
    let staged = vec!["svc/handlers.py".to_string()];

    let first = Classifier::new().classify(diff, &staged, &[]);
    for _ in 0..10 {
        let next = Classifier::new().classify(diff, &staged, &[]);
        assert_eq!(next.category, first.category);
        assert_eq!(next.confidence, first.confidence);
        assert_eq!(next.scope, first.scope);
    }
}

#[test]
fn test_removed_public_function_marks_breaking() {
    let diff = "diff --git a/api.py b/api.py\n\
                -def public_function(x):\n\
                -    return x * 2\n";
    let c = Classifier::new().classify(diff, &["api.py".to_string()], &[]);
    assert!(c.breaking_change);
}

#[test]
fn test_private_function_removal_is_not_breaking() {
    let diff = "-def _helper(x):\n-    return x\n+def _helper(x, y):\n+    return x + y\n";
    let c = Classifier::new().classify(diff, &["util.py".to_string()], &[]);
    assert!(!c.breaking_change);
}

#[test]
fn test_confidence_stays_in_unit_interval() {
    // Keyword-stuffed diff that would overflow without the cap.
    let diff = "+fix bug error crash exception issue resolve repair correct fix fix\n\
                -broken broken broken\n";
    let c = Classifier::new().classify(diff, &["core/fixes.py".to_string()], &[]);
    assert!(c.confidence <= 1.0);
    assert!(c.confidence >= 0.0);
}

#[test]
fn test_empty_diff_yields_low_confidence_chore() {
    let c = Classifier::new().classify("", &[], &[]);
    assert_eq!(c.category, Category::Chore);
    assert!((c.confidence - 0.3).abs() < 1e-9);
}
