use pretty_assertions::assert_eq;
use riskdash_core::{update, DashboardState, Document, Msg};

fn viewing(companies: &[&str]) -> DashboardState {
    let mut state = DashboardState::new();
    for company in companies {
        state = update(state, Msg::CompanySelected(company.to_string())).0;
    }
    state.consume_dirty();
    state
}

fn assert_ignored(state: DashboardState, msg: Msg) {
    let (next, effects) = update(state.clone(), msg);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn history_for_another_company_is_ignored() {
    assert_ignored(
        viewing(&["ACME"]),
        Msg::HistoryLoaded {
            company: "GLOBEX".to_string(),
            results: Vec::new(),
        },
    );
}

#[test]
fn upload_for_another_company_is_ignored() {
    let document: Document = serde_json::from_value(serde_json::json!({
        "company_symbol": "GLOBEX",
        "fiscal_year": 2023,
        "page_count": 40,
        "word_count": 9000,
        "upload_date": "2024-02-01T08:30:00Z",
    }))
    .unwrap();

    assert_ignored(viewing(&["ACME"]), Msg::DocumentUploaded(document));
}

#[test]
fn tick_from_an_earlier_scope_is_ignored() {
    let first_scope = viewing(&["ACME"]).scope();
    let state = viewing(&["ACME", "GLOBEX"]);
    assert_ne!(state.scope(), first_scope);

    assert_ignored(state, Msg::PollTick { scope: first_scope });
}
