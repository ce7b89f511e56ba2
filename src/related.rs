//! Ranks the posts related to a given post.

use crate::post::Post;

/// The number of related posts listed on a post page.
pub const MAX_RELATED: usize = 8;

/// Points for sharing the subject's cluster.
const CLUSTER_SCORE: u32 = 10;

/// Points for each tag shared with the subject.
const TAG_SCORE: u32 = 2;

/// A candidate post paired with its relevance to the subject post.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Related<'a> {
    pub post: &'a Post,
    pub score: u32,
}

/// Scores `candidate` against `subject`: [`CLUSTER_SCORE`] for a shared
/// cluster plus [`TAG_SCORE`] per shared tag. Tags compare as exact strings.
pub fn score(subject: &Post, candidate: &Post) -> u32 {
    let mut score = 0;
    if candidate.cluster.is_some() && candidate.cluster == subject.cluster {
        score += CLUSTER_SCORE;
    }
    let shared = candidate
        .tags
        .iter()
        .filter(|tag| subject.tags.contains(tag))
        .count() as u32;
    score + shared * TAG_SCORE
}

/// Returns at most `max` posts related to `subject`, best first. Posts that
/// score zero are never related. Equal scores are ordered by slug, so the
/// result doesn't depend on the order of `posts`.
pub fn related<'a>(posts: &'a [Post], subject: &Post, max: usize) -> Vec<Related<'a>> {
    let mut ranked: Vec<Related<'a>> = posts
        .iter()
        .filter(|p| p.slug != subject.slug)
        .map(|p| Related {
            post: p,
            score: score(subject, p),
        })
        .filter(|r| r.score > 0)
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.post.slug.cmp(&b.post.slug))
    });
    ranked.truncate(max);
    ranked
}
