//! End-to-end runs against in-memory seams.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::NaiveDate;
use ebmig_client::FakeSource;
use ebmig_core::account::{AccountCategory, RelationType, SourceAccount, SourceRelation};
use ebmig_core::mutation::{Mutation, MutationRow, MutationType, RowSide};
use ebmig_shared::{
    ChannelProgressBus, FeatureFlags, MigrationConfig, NullProgressBus, SourceConfig, TargetConfig,
};
use ebmig_store::{
    DocumentStore, MemoryMutationCache, MemoryStore, MutationCache, TargetDocument,
};
use rust_decimal_macros::dec;

use crate::orchestrator::{Orchestrator, RunStatus};

fn config() -> MigrationConfig {
    MigrationConfig {
        source: SourceConfig {
            api_url: "http://localhost/api".into(),
            access_token: "token".into(),
            source_application: "ebmig".into(),
        },
        target: TargetConfig {
            default_company: "Acme".into(),
            default_cost_center: "Main - A".into(),
            default_bank_account: "Bank - A".into(),
            default_receivable: "Debtors - A".into(),
            default_payable: "Creditors - A".into(),
            default_income_account: "Sales - A".into(),
            default_expense_account: "Misc Expenses - A".into(),
        },
        flags: FeatureFlags {
            migrate_accounts: true,
            migrate_customers: true,
            migrate_suppliers: true,
            migrate_transactions: true,
            dry_run: false,
            date_from: None,
            date_to: None,
        },
    }
}

fn account(code: &str, description: &str, category: AccountCategory) -> SourceAccount {
    SourceAccount {
        code: code.to_string(),
        description: description.to_string(),
        category,
        group: None,
    }
}

fn relation(id: i64, relation_type: RelationType, name: &str) -> SourceRelation {
    SourceRelation {
        id,
        relation_type,
        name: name.to_string(),
        email: None,
        phone: None,
        city: None,
    }
}

fn row(code: &str, amount: rust_decimal::Decimal, side: Option<RowSide>) -> MutationRow {
    MutationRow {
        ledger_code: code.to_string(),
        amount,
        side,
        vat_code: None,
        vat_amount: None,
        description: None,
    }
}

fn mutation(
    id: i64,
    mutation_type: MutationType,
    relation_id: Option<i64>,
    rows: Vec<MutationRow>,
) -> Mutation {
    Mutation {
        id,
        mutation_type,
        date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap(),
        description: format!("Mutation {id}"),
        invoice_number: Some(format!("F{id}")),
        entry_number: None,
        relation_id,
        rows,
        in_ex_vat: None,
        term_of_payment: None,
    }
}

/// A small but representative source bookkeeping.
fn seeded_source() -> FakeSource {
    let mut source = FakeSource::new();
    source.set_accounts(vec![
        account("1010", "Bankrekening", AccountCategory::Financial),
        account("1300", "Debiteuren", AccountCategory::Debtors),
        account("1600", "Crediteuren", AccountCategory::Creditors),
        account("4010", "Kantoorkosten", AccountCategory::ProfitLoss),
        account("8000", "Omzet diensten", AccountCategory::ProfitLoss),
    ]);
    source.set_relations(vec![
        relation(500, RelationType::Customer, "Jansen BV"),
        relation(600, RelationType::Supplier, "Kantoorshop"),
    ]);
    // One mutation of each in-scope document shape plus an opening balance.
    source.add_mutation(mutation(
        1,
        MutationType::Opening,
        None,
        vec![row("1010", dec!(5000.00), Some(RowSide::Debit))],
    ));
    source.add_mutation(mutation(
        10,
        MutationType::PurchaseInvoice,
        Some(600),
        vec![row("4010", dec!(121.00), None)],
    ));
    source.add_mutation(mutation(
        11,
        MutationType::SalesInvoice,
        Some(500),
        vec![row("8000", dec!(250.00), None)],
    ));
    source.add_mutation(mutation(
        12,
        MutationType::CustomerPayment,
        Some(500),
        vec![row("1010", dec!(250.00), None)],
    ));
    source.add_mutation(mutation(
        13,
        MutationType::MoneySent,
        None,
        vec![row("4010", dec!(45.00), None)],
    ));
    source.add_mutation(mutation(
        14,
        MutationType::Journal,
        None,
        vec![
            row("4010", dec!(80.00), Some(RowSide::Debit)),
            row("8000", dec!(80.00), Some(RowSide::Credit)),
        ],
    ));
    source
}

fn orchestrator(source: FakeSource, store: Arc<MemoryStore>) -> Orchestrator {
    Orchestrator::new(
        Arc::new(source),
        store,
        Arc::new(MemoryMutationCache::new()),
        config(),
    )
}

#[tokio::test]
async fn test_full_run_imports_everything() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store.clone());

    let report = orch.run(&NullProgressBus).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.progress_percentage, 100);
    assert!(!report.cancelled);
    assert!(report.end_time.is_some());
    assert_eq!(report.customers_created, 1);
    assert_eq!(report.suppliers_created, 1);
    // 5 chart accounts on top of roots and defaults.
    assert!(report.accounts_created >= 10);
    // Five document-producing mutations; the opening balance is skipped.
    assert_eq!(report.imported, 5);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(store.document_count().await.unwrap(), 5);
}

#[tokio::test]
async fn test_sales_invoice_binds_party_and_item() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store.clone());
    orch.run(&NullProgressBus).await;

    let TargetDocument::SalesInvoice(invoice) = store.document_for_mutation(11).unwrap() else {
        panic!("expected a sales invoice for mutation 11");
    };
    assert_eq!(invoice.name, "SINV-EBH-11");
    assert_eq!(invoice.customer, "Jansen BV");
    assert_eq!(invoice.debit_to, "Debtors - A");
    assert_eq!(invoice.lines.len(), 1);
    let line = &invoice.lines[0];
    assert_eq!(line.item_code, "EB-8000");
    assert_eq!(line.rate, dec!(250.00));
    assert_eq!(line.income_account.as_deref(), Some("8000 - Omzet diensten"));

    // The mapped item was created once and is reusable.
    assert!(store.item_by_code("EB-8000").await.unwrap().is_some());
}

#[tokio::test]
async fn test_purchase_invoice_uses_supplier_and_expense_account() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store.clone());
    orch.run(&NullProgressBus).await;

    let TargetDocument::PurchaseInvoice(invoice) = store.document_for_mutation(10).unwrap() else {
        panic!("expected a purchase invoice for mutation 10");
    };
    assert_eq!(invoice.supplier, "Kantoorshop");
    assert_eq!(invoice.bill_no, "F10");
    assert_eq!(invoice.credit_to, "Creditors - A");
    assert_eq!(
        invoice.lines[0].expense_account.as_deref(),
        Some("4010 - Kantoorkosten")
    );
}

#[tokio::test]
async fn test_customer_payment_moves_money_to_bank() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store.clone());
    orch.run(&NullProgressBus).await;

    let TargetDocument::PaymentEntry(payment) = store.document_for_mutation(12).unwrap() else {
        panic!("expected a payment entry for mutation 12");
    };
    assert_eq!(payment.party, "Jansen BV");
    assert_eq!(payment.paid_amount, dec!(250.00));
    assert_eq!(payment.paid_from, "Debtors - A");
    // The row pointed at the source bank account 1010.
    assert_eq!(payment.paid_to, "1010 - Bankrekening");
}

#[tokio::test]
async fn test_journals_balance() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store.clone());
    orch.run(&NullProgressBus).await;

    for id in [13, 14] {
        let TargetDocument::JournalEntry(entry) = store.document_for_mutation(id).unwrap() else {
            panic!("expected a journal entry for mutation {id}");
        };
        assert!(entry.is_balanced(), "journal for mutation {id} unbalanced");
    }

    // Type 6 got a bank leg; type 7 balanced on its own rows.
    let TargetDocument::JournalEntry(sent) = store.document_for_mutation(13).unwrap() else {
        unreachable!();
    };
    assert_eq!(sent.lines.len(), 2);
    assert!(sent.lines.iter().any(|l| l.account == "Bank - A"));

    let TargetDocument::JournalEntry(journal) = store.document_for_mutation(14).unwrap() else {
        unreachable!();
    };
    assert_eq!(journal.lines.len(), 2);
    assert!(journal.lines.iter().all(|l| l.account != "Bank - A"));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store.clone());

    let first = orch.run(&NullProgressBus).await;
    let count_after_first = store.document_count().await.unwrap();
    let second = orch.run(&NullProgressBus).await;

    assert_eq!(first.imported, 5);
    assert_eq!(second.imported, 0);
    // Opening balance plus the five already-imported mutations.
    assert_eq!(second.skipped, 6);
    assert_eq!(store.document_count().await.unwrap(), count_after_first);
    assert_eq!(second.accounts_created, 0);
    assert_eq!(second.customers_created, 0);
}

#[tokio::test]
async fn test_dry_run_creates_no_documents() {
    let store = Arc::new(MemoryStore::new());
    let mut cfg = config();
    cfg.flags.dry_run = true;
    let orch = Orchestrator::new(
        Arc::new(seeded_source()),
        store.clone(),
        Arc::new(MemoryMutationCache::new()),
        cfg,
    );

    let report = orch.run(&NullProgressBus).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.imported, 5);
    assert_eq!(store.document_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unmappable_journal_is_counted_not_fatal() {
    let mut source = seeded_source();
    // A journal over a ledger code the chart does not contain.
    source.add_mutation(mutation(
        20,
        MutationType::Journal,
        None,
        vec![row("9999", dec!(10.00), Some(RowSide::Debit))],
    ));
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(source, store.clone());

    let report = orch.run(&NullProgressBus).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.failed, 1);
    assert_eq!(report.imported, 5);
    assert_eq!(report.error_log.len(), 1);
    assert!(report.error_log[0].contains("9999"));
    assert!(store.document_for_mutation(20).is_none());
}

#[tokio::test]
async fn test_cancellation_ends_completed_with_partial_counts() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store.clone());
    orch.cancel_handle().store(true, Ordering::Relaxed);

    let report = orch.run(&NullProgressBus).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert!(report.cancelled);
    assert_eq!(report.imported, 0);
    // Preparation still ran before the flag was checked.
    assert!(report.accounts_created > 0);
}

#[tokio::test]
async fn test_run_publishes_progress_and_completion() {
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(seeded_source(), store);
    let (bus, mut rx) = ChannelProgressBus::new();

    orch.run(&bus).await;

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert!(!events.is_empty());
    // Percentages never go backwards.
    let pcts: Vec<u8> = events.iter().filter_map(|e| e.progress).collect();
    assert!(pcts.windows(2).all(|w| w[0] <= w[1]));
    assert!(events.last().is_some_and(|e| e.completed));
}

#[tokio::test]
async fn test_fetch_into_cache_fills_the_cache() {
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(MemoryMutationCache::new());
    let orch = Orchestrator::new(
        Arc::new(seeded_source()),
        store,
        cache.clone(),
        config(),
    );

    let stats = orch.fetch_into_cache(&NullProgressBus).await.unwrap();

    assert_eq!(stats.found, 6);
    assert_eq!(stats.cached, 6);
    let summary = cache.statistics().await.unwrap();
    assert_eq!(summary.total, 6);
    assert_eq!(summary.id_range, Some((1, 14)));

    // A second crawl adds nothing new.
    let again = orch.fetch_into_cache(&NullProgressBus).await.unwrap();
    assert_eq!(again.cached, 0);
}
