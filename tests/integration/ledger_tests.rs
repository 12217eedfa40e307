//! Loan ledger and catalog behaviour against a real SQLite store

use chrono::NaiveDate;

use pustaka_server::{
    models::{
        account::{Caller, MemberLogin, RegisterMember},
        book::CreateBook,
        loan::CreateLoan,
        LoanStatus,
    },
    AppError, AppState,
};

use crate::common::{add_book, add_member, file_state, memory_state, stock_of, MASTER_KEY};

fn loan_request(book_id: i64, member_id: i64) -> CreateLoan {
    CreateLoan {
        book_id,
        member_id,
        loan_date: NaiveDate::from_ymd_opt(2024, 1, 1),
    }
}

fn registration(name: &str, username: &str) -> RegisterMember {
    RegisterMember {
        name: name.to_string(),
        username: username.to_string(),
        password: "rahasia-anggota".to_string(),
        address: Some("Jl. Merdeka 1".to_string()),
        phone: None,
    }
}

async fn assert_conserved(state: &AppState, book_id: i64, initial: i64) {
    let stock = stock_of(state, book_id).await;
    let open = state
        .services
        .repository
        .loans
        .count_open_for_book(book_id)
        .await
        .unwrap();
    assert_eq!(stock + open, initial);
}

#[tokio::test]
async fn test_atlas_scenario() {
    let state = memory_state().await;
    let loans = &state.services.loans;
    let book = add_book(&state, "Atlas", 1).await;
    let member = add_member(&state, "Sari").await;

    let loan = loans.create_loan(loan_request(book.id, member.id)).await.unwrap();
    assert_eq!(loan.status, LoanStatus::Open);
    assert_eq!(loan.loan_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(stock_of(&state, book.id).await, 0);

    let second = loans.create_loan(loan_request(book.id, member.id)).await;
    match second {
        Err(AppError::Conflict(msg)) => assert!(msg.contains("out of stock")),
        other => panic!("expected out of stock, got {:?}", other),
    }

    let (returned, record) = loans.return_loan(loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert_eq!(record.loan_id, loan.id);
    assert_eq!(record.fine, 0);
    assert_eq!(stock_of(&state, book.id).await, 1);

    let deleted = loans.delete_loan(loan.id).await.unwrap();
    assert_eq!(deleted.status, LoanStatus::Returned);
    assert_eq!(stock_of(&state, book.id).await, 1);
}

#[tokio::test]
async fn test_out_of_stock_writes_no_loan() {
    let state = memory_state().await;
    let book = add_book(&state, "Laskar Pelangi", 0).await;
    let member = add_member(&state, "Budi").await;

    let result = state.services.loans.create_loan(loan_request(book.id, member.id)).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    assert!(state.services.loans.list_loans().await.unwrap().is_empty());
    assert_eq!(stock_of(&state, book.id).await, 0);
}

#[tokio::test]
async fn test_loan_for_unknown_book_or_member() {
    let state = memory_state().await;
    let book = add_book(&state, "Bumi Manusia", 2).await;
    let member = add_member(&state, "Dewi").await;

    let missing_book = state.services.loans.create_loan(loan_request(999, member.id)).await;
    assert!(matches!(missing_book, Err(AppError::NotFound(_))));

    // The decrement taken before the member check must be rolled back
    let missing_member = state.services.loans.create_loan(loan_request(book.id, 999)).await;
    assert!(matches!(missing_member, Err(AppError::NotFound(_))));
    assert_eq!(stock_of(&state, book.id).await, 2);
    assert!(state.services.loans.list_loans().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_loan_date_defaults_to_today() {
    let state = memory_state().await;
    let book = add_book(&state, "Ronggeng Dukuh Paruk", 1).await;
    let member = add_member(&state, "Eka").await;

    let loan = state
        .services
        .loans
        .create_loan(CreateLoan {
            book_id: book.id,
            member_id: member.id,
            loan_date: None,
        })
        .await
        .unwrap();

    assert_eq!(loan.loan_date, chrono::Utc::now().date_naive());
}

#[tokio::test]
async fn test_double_return_is_rejected() {
    let state = memory_state().await;
    let loans = &state.services.loans;
    let book = add_book(&state, "Cantik Itu Luka", 3).await;
    let member = add_member(&state, "Fajar").await;

    let loan = loans.create_loan(loan_request(book.id, member.id)).await.unwrap();
    loans.return_loan(loan.id).await.unwrap();
    assert_eq!(stock_of(&state, book.id).await, 3);

    let again = loans.return_loan(loan.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(stock_of(&state, book.id).await, 3);

    let unknown = loans.return_loan(4242).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_open_loan_restores_stock() {
    let state = memory_state().await;
    let loans = &state.services.loans;
    let book = add_book(&state, "Negeri 5 Menara", 2).await;
    let member = add_member(&state, "Gita").await;

    let loan = loans.create_loan(loan_request(book.id, member.id)).await.unwrap();
    assert_eq!(stock_of(&state, book.id).await, 1);

    let deleted = loans.delete_loan(loan.id).await.unwrap();
    assert_eq!(deleted.status, LoanStatus::Open);
    assert_eq!(stock_of(&state, book.id).await, 2);

    let again = loans.delete_loan(loan.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
    assert_eq!(stock_of(&state, book.id).await, 2);
}

#[tokio::test]
async fn test_stock_plus_open_loans_is_conserved() {
    let state = memory_state().await;
    let loans = &state.services.loans;
    let initial = 3;
    let book = add_book(&state, "Perahu Kertas", initial).await;
    let member = add_member(&state, "Hadi").await;

    let a = loans.create_loan(loan_request(book.id, member.id)).await.unwrap();
    assert_conserved(&state, book.id, initial).await;
    let b = loans.create_loan(loan_request(book.id, member.id)).await.unwrap();
    assert_conserved(&state, book.id, initial).await;
    let c = loans.create_loan(loan_request(book.id, member.id)).await.unwrap();
    assert_conserved(&state, book.id, initial).await;
    assert!(loans.create_loan(loan_request(book.id, member.id)).await.is_err());
    assert_conserved(&state, book.id, initial).await;

    loans.return_loan(a.id).await.unwrap();
    assert_conserved(&state, book.id, initial).await;
    assert!(loans.return_loan(a.id).await.is_err());
    assert_conserved(&state, book.id, initial).await;
    loans.delete_loan(a.id).await.unwrap();
    assert_conserved(&state, book.id, initial).await;
    loans.delete_loan(b.id).await.unwrap();
    assert_conserved(&state, book.id, initial).await;
    loans.return_loan(c.id).await.unwrap();
    assert_conserved(&state, book.id, initial).await;

    assert_eq!(stock_of(&state, book.id).await, initial);
}

#[tokio::test]
async fn test_concurrent_loans_on_last_copy() {
    let dir = tempfile::tempdir().unwrap();
    let state = file_state(&dir).await;
    let book = add_book(&state, "Atlas", 1).await;
    let alice = add_member(&state, "Alice").await;
    let bima = add_member(&state, "Bima").await;

    let loans = &state.services.loans;
    let (first, second) = tokio::join!(
        loans.create_loan(loan_request(book.id, alice.id)),
        loans.create_loan(loan_request(book.id, bima.id)),
    );

    let results = [first, second];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    let out_of_stock = results
        .iter()
        .filter(|r| matches!(r, Err(AppError::Conflict(_))))
        .count();

    assert_eq!(successes, 1);
    assert_eq!(out_of_stock, 1);
    assert_eq!(stock_of(&state, book.id).await, 0);
    assert_eq!(
        state.services.repository.loans.count_open_for_book(book.id).await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_delete_book_blocked_by_open_loan() {
    let state = memory_state().await;
    let catalog = &state.services.catalog;
    let book = add_book(&state, "Gadis Pantai", 1).await;
    let member = add_member(&state, "Intan").await;

    let loan = state.services.loans.create_loan(loan_request(book.id, member.id)).await.unwrap();

    assert!(matches!(catalog.delete_book(book.id).await, Err(AppError::Conflict(_))));

    state.services.loans.return_loan(loan.id).await.unwrap();
    catalog.delete_book(book.id).await.unwrap();

    assert!(matches!(catalog.delete_book(book.id).await, Err(AppError::NotFound(_))));

    // History survives the book
    let details = state.services.loans.get_loan(loan.id).await.unwrap();
    assert_eq!(details.book_id, None);
    assert_eq!(details.book_title, None);
    assert_eq!(details.member_name.as_deref(), Some("Intan"));
}

#[tokio::test]
async fn test_delete_member_blocked_by_open_loan() {
    let state = memory_state().await;
    let catalog = &state.services.catalog;
    let book = add_book(&state, "Saman", 1).await;
    let member = add_member(&state, "Joko").await;

    let loan = state.services.loans.create_loan(loan_request(book.id, member.id)).await.unwrap();

    assert!(matches!(catalog.delete_member(member.id).await, Err(AppError::Conflict(_))));

    state.services.loans.delete_loan(loan.id).await.unwrap();
    catalog.delete_member(member.id).await.unwrap();

    assert!(matches!(catalog.delete_member(member.id).await, Err(AppError::NotFound(_))));
    assert!(matches!(catalog.get_member(member.id).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_listings_are_newest_first() {
    let state = memory_state().await;
    let first = add_book(&state, "Pertama", 1).await;
    let second = add_book(&state, "Kedua", 1).await;
    let member = add_member(&state, "Kartika").await;

    let books = state.services.catalog.list_books().await.unwrap();
    assert_eq!(books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![second.id, first.id]);

    let a = state.services.loans.create_loan(loan_request(first.id, member.id)).await.unwrap();
    let b = state.services.loans.create_loan(loan_request(second.id, member.id)).await.unwrap();

    let all = state.services.loans.list_loans().await.unwrap();
    assert_eq!(all.iter().map(|l| l.id).collect::<Vec<_>>(), vec![b.id, a.id]);
    assert_eq!(all[0].book_title.as_deref(), Some("Kedua"));
    assert_eq!(all[0].member_name.as_deref(), Some("Kartika"));

    let dashboard = state.services.loans.list_member_loans(member.id).await.unwrap();
    assert_eq!(dashboard.len(), 2);
    assert_eq!(dashboard[1].book_title.as_deref(), Some("Pertama"));
    assert_eq!(dashboard[1].status, LoanStatus::Open);
}

#[tokio::test]
async fn test_dashboard_for_unknown_member() {
    let state = memory_state().await;
    let result = state.services.loans.list_member_loans(77).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_duplicate_registration_leaves_no_orphan() {
    let state = memory_state().await;
    let auth = &state.services.auth;
    let members = &state.services.repository.members;

    let session = auth.register_member(registration("Lestari", "lestari")).await.unwrap();
    assert!(session.api_key.starts_with("user-"));
    assert_eq!(members.count().await.unwrap(), 1);

    let duplicate = auth.register_member(registration("Lestari Dua", "lestari")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert_eq!(members.count().await.unwrap(), 1);

    let profile = state.services.catalog.get_member(session.member_id).await.unwrap();
    assert_eq!(profile.name, "Lestari");
    assert_eq!(profile.address, "Jl. Merdeka 1");
}

#[tokio::test]
async fn test_registration_validates_fields() {
    let state = memory_state().await;
    let mut request = registration("", "x");
    request.password = "pw".to_string();

    let result = state.services.auth.register_member(request).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(state.services.repository.members.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_blank_names_are_rejected() {
    let state = memory_state().await;

    let book = state
        .services
        .catalog
        .create_book(CreateBook {
            title: "   ".to_string(),
            stock: 1,
        })
        .await;
    assert!(matches!(book, Err(AppError::Validation(_))));
    assert!(state.services.catalog.list_books().await.unwrap().is_empty());

    let registered = state.services.auth.register_member(registration("  ", "kosong")).await;
    assert!(matches!(registered, Err(AppError::Validation(_))));
    assert_eq!(state.services.repository.members.count().await.unwrap(), 0);

    let book = add_book(&state, "  Pulang  ", 1).await;
    assert_eq!(book.title, "Pulang");
}

#[tokio::test]
async fn test_gate_resolves_master_and_member_keys() {
    let state = memory_state().await;
    let auth = &state.services.auth;

    assert_eq!(auth.authenticate_key(MASTER_KEY).await.unwrap(), Caller::Staff);

    let session = auth.register_member(registration("Maya", "maya")).await.unwrap();
    let caller = auth.authenticate_key(&session.api_key).await.unwrap();
    assert_eq!(
        caller,
        Caller::Member {
            member_id: session.member_id,
            username: "maya".to_string(),
        }
    );

    for bad in ["", "nope", "user-"] {
        assert!(matches!(
            auth.authenticate_key(bad).await,
            Err(AppError::Authentication(_))
        ));
    }
}

#[tokio::test]
async fn test_login_reissues_or_keeps_key() {
    let state = memory_state().await;
    let auth = &state.services.auth;
    let registered = auth.register_member(registration("Nadia", "nadia")).await.unwrap();

    let login = |api_key: Option<&str>, password: &str| MemberLogin {
        username: "nadia".to_string(),
        password: password.to_string(),
        api_key: api_key.map(str::to_string),
    };

    let fresh = auth.login_member(login(None, "rahasia-anggota")).await.unwrap();
    assert_ne!(fresh.api_key, registered.api_key);
    assert!(auth.authenticate_key(&registered.api_key).await.is_err());
    assert!(auth.authenticate_key(&fresh.api_key).await.is_ok());

    let kept = auth
        .login_member(login(Some("user-KEEPTHISKEY"), "rahasia-anggota"))
        .await
        .unwrap();
    assert_eq!(kept.api_key, "user-KEEPTHISKEY");
    assert_eq!(kept.member_id, registered.member_id);

    assert!(matches!(
        auth.login_member(login(None, "wrong-password")).await,
        Err(AppError::Authentication(_))
    ));
    assert!(matches!(
        auth.login_member(login(Some("short"), "rahasia-anggota")).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        auth.login_member(login(Some(MASTER_KEY), "rahasia-anggota")).await,
        Err(AppError::Validation(_))
    ));

    let unknown = MemberLogin {
        username: "nobody".to_string(),
        password: "rahasia-anggota".to_string(),
        api_key: None,
    };
    assert!(matches!(auth.login_member(unknown).await, Err(AppError::Authentication(_))));
}

#[tokio::test]
async fn test_proposed_key_cannot_be_shared() {
    let state = memory_state().await;
    let auth = &state.services.auth;
    let first = auth.register_member(registration("Oki", "oki")).await.unwrap();
    auth.register_member(registration("Putri", "putri")).await.unwrap();

    let steal = MemberLogin {
        username: "putri".to_string(),
        password: "rahasia-anggota".to_string(),
        api_key: Some(first.api_key.clone()),
    };
    assert!(matches!(auth.login_member(steal).await, Err(AppError::Conflict(_))));

    let owner = auth.authenticate_key(&first.api_key).await.unwrap();
    assert_eq!(owner.member_id(), Some(first.member_id));
}

#[tokio::test]
async fn test_deleting_member_revokes_key() {
    let state = memory_state().await;
    let auth = &state.services.auth;
    let session = auth.register_member(registration("Rina", "rina")).await.unwrap();

    state.services.catalog.delete_member(session.member_id).await.unwrap();

    assert!(matches!(
        auth.authenticate_key(&session.api_key).await,
        Err(AppError::Authentication(_))
    ));
}
