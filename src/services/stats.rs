//! Blog statistics
//!
//! Pure reductions over a slice of blog records:
//! - `dummy` - constant probe of the calling convention
//! - `total_likes` - sum of likes
//! - `favorite_blog` - the most liked record
//! - `most_blogs` - the author with the most records
//! - `most_likes` - the author with the highest like total
//!
//! Ties always go to the candidate seen first in input order. Functions that
//! have no meaningful answer for an empty slice return `StatsError::EmptyInput`
//! instead of a fabricated zero value.
//!
//! Like sums are accumulated as `u128`: a record holds at most `u64::MAX`
//! likes, so no slice that fits in memory can overflow the total.

use serde::Serialize;
use std::collections::HashMap;
use std::ops::AddAssign;

use crate::models::Blog;

/// Error types for statistics over blog collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    /// No records to pick a winner from
    #[error("cannot compute statistic of an empty blog list")]
    EmptyInput,
}

/// The most liked blog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteBlog {
    pub title: String,
    pub author: String,
    pub likes: u64,
}

/// Author with the largest number of blogs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorBlogs {
    pub author: String,
    pub blogs: usize,
}

/// Author with the largest like total
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorLikes {
    pub author: String,
    pub likes: u128,
}

/// All statistics for one collection, used by the dashboard endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogStats {
    pub blogs: usize,
    pub total_likes: u128,
    pub favorite_blog: Option<FavoriteBlog>,
    pub most_blogs: Option<AuthorBlogs>,
    pub most_likes: Option<AuthorLikes>,
}

/// Per-author accumulated values in order of first appearance.
///
/// Built once by `AuthorTally::fold` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorTally<'a, V> {
    entries: Vec<(&'a str, V)>,
}

impl<'a, V> AuthorTally<'a, V>
where
    V: Copy + Ord + AddAssign,
{
    /// Group `blogs` by author and reduce each group with `value`.
    ///
    /// The first record of an author seeds its entry; later records are added
    /// to it. Entry order is the order in which authors first appear.
    pub fn fold<F>(blogs: &'a [Blog], value: F) -> Self
    where
        F: Fn(&Blog) -> V,
    {
        let (entries, _) = blogs.iter().fold(
            (Vec::new(), HashMap::new()),
            |(mut entries, mut positions): (Vec<(&'a str, V)>, HashMap<&'a str, usize>), blog| {
                let author = blog.author.as_str();
                match positions.get(author) {
                    Some(&index) => entries[index].1 += value(blog),
                    None => {
                        positions.insert(author, entries.len());
                        entries.push((author, value(blog)));
                    }
                }
                (entries, positions)
            },
        );
        Self { entries }
    }

    /// Entries in first-appearance order
    pub fn entries(&self) -> &[(&'a str, V)] {
        &self.entries
    }

    /// The first entry holding the maximum value.
    pub fn leader(&self) -> Option<(&'a str, V)> {
        first_max_by_key(self.entries.iter().copied(), |&(_, value)| value)
    }
}

/// Select the first item whose key equals the maximum key.
///
/// `Iterator::max_by_key` returns the last maximum, so ties are resolved here
/// with a strict comparison instead.
fn first_max_by_key<T, K, I, F>(items: I, key: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    K: Ord,
    F: Fn(&T) -> K,
{
    items.into_iter().fold(None, |best: Option<(T, K)>, item| {
        let k = key(&item);
        match best {
            Some((best_item, best_key)) if k <= best_key => Some((best_item, best_key)),
            _ => Some((item, k)),
        }
    })
    .map(|(item, _)| item)
}

/// Always returns 1.
pub fn dummy(_blogs: &[Blog]) -> u32 {
    1
}

/// Sum of likes across all blogs; 0 for an empty slice.
pub fn total_likes(blogs: &[Blog]) -> u128 {
    blogs.iter().map(|blog| u128::from(blog.likes)).sum()
}

/// The first blog holding the maximum like count.
pub fn favorite_blog(blogs: &[Blog]) -> Result<FavoriteBlog, StatsError> {
    let favorite = first_max_by_key(blogs, |blog| blog.likes).ok_or(StatsError::EmptyInput)?;

    Ok(FavoriteBlog {
        title: favorite.title.clone(),
        author: favorite.author.clone(),
        likes: favorite.likes,
    })
}

/// The author with the most blogs.
pub fn most_blogs(blogs: &[Blog]) -> Result<AuthorBlogs, StatsError> {
    let (author, count) = AuthorTally::fold(blogs, |_| 1usize)
        .leader()
        .ok_or(StatsError::EmptyInput)?;

    Ok(AuthorBlogs {
        author: author.to_string(),
        blogs: count,
    })
}

/// The author whose blogs have the most likes in total.
pub fn most_likes(blogs: &[Blog]) -> Result<AuthorLikes, StatsError> {
    let (author, likes) = AuthorTally::fold(blogs, |blog| u128::from(blog.likes))
        .leader()
        .ok_or(StatsError::EmptyInput)?;

    Ok(AuthorLikes {
        author: author.to_string(),
        likes,
    })
}

/// Compute every statistic at once. Empty-input failures become `None`.
pub fn summarize(blogs: &[Blog]) -> BlogStats {
    BlogStats {
        blogs: blogs.len(),
        total_likes: total_likes(blogs),
        favorite_blog: favorite_blog(blogs).ok(),
        most_blogs: most_blogs(blogs).ok(),
        most_likes: most_likes(blogs).ok(),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn blog_strategy() -> impl Strategy<Value = Blog> {
        ("[A-D]", 0u64..1_000).prop_map(|(author, likes)| {
            Blog::new(format!("{}-{}", author, likes), author, "https://example.com", likes)
        })
    }

    fn blogs_strategy() -> impl Strategy<Value = Vec<Blog>> {
        prop::collection::vec(blog_strategy(), 0..30)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Reordering the input never changes the like total.
        #[test]
        fn property_total_likes_order_invariant(blogs in blogs_strategy()) {
            let mut reversed = blogs.clone();
            reversed.reverse();
            let mut sorted = blogs.clone();
            sorted.sort_by(|a, b| a.title.cmp(&b.title));

            prop_assert_eq!(total_likes(&blogs), total_likes(&reversed));
            prop_assert_eq!(total_likes(&blogs), total_likes(&sorted));
        }

        /// The favorite holds the maximum and no earlier record ties it.
        #[test]
        fn property_favorite_is_first_maximum(blogs in blogs_strategy()) {
            match favorite_blog(&blogs) {
                Err(StatsError::EmptyInput) => prop_assert!(blogs.is_empty()),
                Ok(favorite) => {
                    let max = blogs.iter().map(|b| b.likes).max().unwrap();
                    prop_assert_eq!(favorite.likes, max);
                    let first = blogs.iter().find(|b| b.likes == max).unwrap();
                    prop_assert_eq!(&favorite.title, &first.title);
                }
            }
        }

        /// The author totals across the tally add up to the overall totals.
        #[test]
        fn property_tally_sums_match_totals(blogs in blogs_strategy()) {
            let likes: u128 = AuthorTally::fold(&blogs, |b| u128::from(b.likes)).entries().iter().map(|(_, v)| v).sum();
            let counts: usize = AuthorTally::fold(&blogs, |_| 1usize).entries().iter().map(|(_, v)| v).sum();

            prop_assert_eq!(likes, total_likes(&blogs));
            prop_assert_eq!(counts, blogs.len());
        }

        /// No author has strictly more blogs than the reported winner.
        #[test]
        fn property_most_blogs_is_maximal(blogs in blogs_strategy()) {
            if let Ok(winner) = most_blogs(&blogs) {
                for author in ["A", "B", "C", "D"] {
                    let count = blogs.iter().filter(|b| b.author == author).count();
                    prop_assert!(count <= winner.blogs);
                }
            } else {
                prop_assert!(blogs.is_empty());
            }
        }
    }
}
