//! Loan lifecycle tests against the in-memory stores

mod common;

use alexandria_server::{
    config::{EmailConfig, ReminderConfig},
    error::AppError,
    models::{
        book::Book,
        loan::LoanFilter,
        page::Pagination,
    },
    repository::Repository,
    services::Services,
};
use chrono::{Duration, Utc};

fn services_with(repository: Repository) -> Services {
    Services::new(repository, EmailConfig::default(), ReminderConfig::default())
}

fn services() -> Services {
    services_with(common::repository())
}

async fn create_book(services: &Services, title: &str, author: &str, isbn: &str) -> Book {
    services
        .catalog
        .create(Book {
            id: None,
            title: title.to_string(),
            author: author.to_string(),
            isbn: isbn.to_string(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn a_book_goes_out_comes_back_and_goes_out_again() {
    let services = services();
    let today = Utc::now().date_naive();

    create_book(&services, "As aventuras", "Artur", "001").await;

    let book = services
        .catalog
        .get_by_isbn("001")
        .await
        .unwrap()
        .expect("book should be found by isbn");

    // First checkout succeeds and starts outstanding
    let loan = services
        .loans
        .create_loan(&book, "Fulano".to_string(), None, today)
        .await
        .unwrap();
    assert!(loan.id.is_some());
    assert!(loan.is_outstanding());

    // Any second checkout of the same book is rejected
    let err = services
        .loans
        .create_loan(&book, "Ciclano".to_string(), None, today)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BookAlreadyLoaned));

    let history = services
        .loans
        .get_loans_by_book(&book, &Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);

    // Return the book
    let mut returned = services
        .loans
        .get_by_id(loan.id.unwrap())
        .await
        .unwrap()
        .expect("loan should be found");
    returned.returned = Some(true);
    let updated = services.loans.update_loan(&returned).await.unwrap();
    assert!(!updated.is_outstanding());

    // Now the book can go out again
    let second = services
        .loans
        .create_loan(&book, "Ciclano".to_string(), None, today)
        .await
        .unwrap();
    assert!(second.is_outstanding());

    let history = services
        .loans
        .get_loans_by_book(&book, &Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 2);
}

#[tokio::test]
async fn loan_search_is_a_union_of_isbn_and_customer_matches() {
    let services = services();
    let today = Utc::now().date_naive();

    let by_isbn = create_book(&services, "As aventuras", "Artur", "123").await;
    let by_customer = create_book(&services, "Outro livro", "Fulano", "999").await;
    let unrelated = create_book(&services, "Terceiro", "Beltrano", "555").await;

    services
        .loans
        .create_loan(&by_isbn, "Fulano".to_string(), None, today)
        .await
        .unwrap();
    services
        .loans
        .create_loan(&by_customer, "Zé".to_string(), None, today)
        .await
        .unwrap();
    services
        .loans
        .create_loan(&unrelated, "Ciclano".to_string(), None, today)
        .await
        .unwrap();

    // One loan matches on isbn, the other on customer; both are returned
    let filter = LoanFilter {
        isbn: Some("123".to_string()),
        customer: Some("Zé".to_string()),
    };
    let page = services
        .loans
        .find(&filter, &Pagination::default())
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    let isbns: Vec<&str> = page.content.iter().map(|l| l.book.isbn.as_str()).collect();
    assert!(isbns.contains(&"123"));
    assert!(isbns.contains(&"999"));

    // A filter matching neither dimension finds nothing
    let none = services
        .loans
        .find(
            &LoanFilter {
                isbn: Some("000".to_string()),
                customer: Some("Nobody".to_string()),
            },
            &Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn late_loans_are_outstanding_and_at_least_four_days_old() {
    let services = services();
    let today = Utc::now().date_naive();

    let b1 = create_book(&services, "Book 1", "Artur", "001").await;
    let b2 = create_book(&services, "Book 2", "Artur", "002").await;
    let b3 = create_book(&services, "Book 3", "Artur", "003").await;
    let b4 = create_book(&services, "Book 4", "Artur", "004").await;

    // Five days out: late
    let late = services
        .loans
        .create_loan(&b1, "Fulano".to_string(), Some("fulano@example.com".to_string()), today - Duration::days(5))
        .await
        .unwrap();

    // Exactly four days out: still late (threshold is inclusive)
    let boundary = services
        .loans
        .create_loan(&b2, "Ciclano".to_string(), None, today - Duration::days(4))
        .await
        .unwrap();

    // Three days out: not late yet
    services
        .loans
        .create_loan(&b3, "Beltrano".to_string(), None, today - Duration::days(3))
        .await
        .unwrap();

    // Ancient but returned: never late
    let mut old_returned = services
        .loans
        .create_loan(&b4, "Zé".to_string(), None, today - Duration::days(30))
        .await
        .unwrap();
    old_returned.returned = Some(true);
    services.loans.update_loan(&old_returned).await.unwrap();

    let late_loans = services.loans.get_all_late_loans().await.unwrap();

    let ids: Vec<Option<i32>> = late_loans.iter().map(|l| l.id).collect();
    assert_eq!(late_loans.len(), 2);
    assert!(ids.contains(&late.id));
    assert!(ids.contains(&boundary.id));
}

#[tokio::test]
async fn re_returning_an_already_returned_loan_is_accepted() {
    let services = services();
    let today = Utc::now().date_naive();

    let book = create_book(&services, "As aventuras", "Artur", "001").await;
    let mut loan = services
        .loans
        .create_loan(&book, "Fulano".to_string(), None, today)
        .await
        .unwrap();

    loan.returned = Some(true);
    services.loans.update_loan(&loan).await.unwrap();

    // Second return of the same loan goes through unchallenged
    let again = services.loans.update_loan(&loan).await.unwrap();
    assert_eq!(again.returned, Some(true));
}

#[tokio::test]
async fn the_store_itself_rejects_a_second_outstanding_loan() {
    let repository = common::repository();
    let services = services_with(repository.clone());
    let today = Utc::now().date_naive();

    let book = create_book(&services, "As aventuras", "Artur", "001").await;
    services
        .loans
        .create_loan(&book, "Fulano".to_string(), None, today)
        .await
        .unwrap();

    // Bypass the service pre-check and write straight to the store: the
    // constraint still holds
    let duplicate = alexandria_server::models::loan::Loan {
        id: None,
        book_id: book.id.unwrap(),
        customer: "Ciclano".to_string(),
        customer_email: None,
        loan_date: today,
        returned: None,
    };
    let err = repository.loans.save(&duplicate).await.unwrap_err();
    assert!(matches!(err, AppError::BookAlreadyLoaned));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_loan_creations_yield_exactly_one_success() {
    let services = services();
    let today = Utc::now().date_naive();

    let book = create_book(&services, "As aventuras", "Artur", "001").await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let loans = services.loans.clone();
        let book = book.clone();
        handles.push(tokio::spawn(async move {
            loans
                .create_loan(&book, format!("customer {}", i), None, today)
                .await
        }));
    }

    let mut successes = 0;
    let mut already_loaned = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::BookAlreadyLoaned) => already_loaned += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(already_loaned, 7);

    let history = services
        .loans
        .get_loans_by_book(&book, &Pagination::default())
        .await
        .unwrap();
    assert_eq!(history.total, 1);
}
