use super::Theme;

pub fn themes() -> Vec<Theme> {
    vec![
        Theme::new(
            "Account Access Issues",
            &["login", "password", "user name", "access", "fingerprint"],
        ),
        Theme::new(
            "Transaction Performance",
            &["slow", "transfer", "fast", "transaction", "payment"],
        ),
        Theme::new(
            "User Interface & Experience",
            &["ui", "interface", "design", "bug", "crash"],
        ),
        Theme::new(
            "Customer Support",
            &["support", "help", "service", "customer care"],
        ),
        Theme::new(
            "Feature Requests",
            &["feature", "add", "option", "loan", "bill payment"],
        ),
    ]
}
