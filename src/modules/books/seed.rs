//! Sample catalog for fresh installations.

use chrono::Utc;

use super::models::NewBook;
use super::query::BookFilter;
use super::repository::BookRepository;
use crate::utils;

const SAMPLE_BOOKS: [(&str, &str, i32, &str); 6] = [
    ("Kuko Ng Agila", "Harper Lee", 1960, "assets/demon1.jpg"),
    ("Deathly Hallows", "George Orwell", 1949, "assets/demon2.jpg"),
    ("Order of the Phoenix", "F. Scott Fitzgerald", 1925, "assets/demon3.jpg"),
    ("The Sorcerers Stone", "Jane Austen", 1813, "assets/demon4.jpg"),
    ("The Great Gatsby", "F. Scott Fitzgerald", 1925, "assets/demon5.jpg"),
    ("Pride and Prejudice", "Jane Austen", 1813, "assets/demon6.jpg"),
];

pub fn sample_books() -> Vec<NewBook> {
    SAMPLE_BOOKS
        .iter()
        .map(|(title, author, year, image)| NewBook {
            title: title.to_string(),
            author: author.to_string(),
            published_year: Some(*year),
            image: image.to_string(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    /// Books inserted by this run; zero when the catalog was not empty.
    pub inserted: usize,
    pub total_books: u64,
    pub books_this_year: u64,
}

/// Insert the sample books only into an empty catalog.
pub async fn seed_if_empty(repo: &dyn BookRepository) -> anyhow::Result<SeedReport> {
    let existing = repo.count(&BookFilter::default()).await?;

    let inserted = if existing > 0 {
        tracing::info!(
            existing,
            "catalog already contains books, skipping sample data"
        );
        0
    } else {
        let books = sample_books();
        let count = books.len();
        for book in books {
            let book = repo.insert(book).await?;
            tracing::info!(
                book_id = %book.id,
                title = %book.title,
                author = %book.author,
                "inserted sample book"
            );
        }
        count
    };

    let total_books = repo.count(&BookFilter::default()).await?;
    let books_this_year = repo
        .count(&BookFilter {
            published_year: Some(utils::current_year(Utc::now())),
            ..BookFilter::default()
        })
        .await?;

    tracing::info!(inserted, total_books, books_this_year, "seeding finished");

    Ok(SeedReport {
        inserted,
        total_books,
        books_this_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::memory::InMemoryBookRepository;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn seeds_empty_catalog_once() {
        let repo = InMemoryBookRepository::new();

        let first = seed_if_empty(&repo).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                inserted: 6,
                total_books: 6,
                books_this_year: 0,
            }
        );

        let second = seed_if_empty(&repo).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.total_books, 6);
    }

    #[tokio::test]
    async fn leaves_existing_catalog_alone() {
        let repo = InMemoryBookRepository::new();
        repo.insert(NewBook {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            published_year: Some(1965),
            image: "assets/libro.jpg".to_string(),
        })
        .await
        .unwrap();

        let report = seed_if_empty(&repo).await.unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.total_books, 1);
    }

    #[test]
    fn sample_titles_and_authors_are_unique_pairs() {
        let books = sample_books();
        for (i, a) in books.iter().enumerate() {
            for b in &books[i + 1..] {
                assert!(a.title != b.title || a.author != b.author);
            }
        }
    }
}
