use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::database::question_store::QuestionStore;
use crate::dto::quiz_dto::{QuizQuestionView, QuizRequest};
use crate::error::Result;
use crate::models::question::Section;

/// Upper bound on questions pulled in a single backfill query.
const BACKFILL_CAP: usize = 1000;

#[derive(Clone)]
pub struct QuizService {
    questions: Arc<dyn QuestionStore>,
}

/// Splits `total` across the three sections: everyone gets `total / 3` and the
/// remainder goes to the first `total % 3` sections of a shuffled order.
/// The result is always in [`Section::ALL`] order.
pub fn allocate_sections<R: Rng + ?Sized>(total: usize, rng: &mut R) -> [(Section, usize); 3] {
    let base = total / Section::ALL.len();
    let remainder = total % Section::ALL.len();

    let mut order = Section::ALL;
    order.shuffle(rng);
    let extra = &order[..remainder];

    Section::ALL.map(|section| {
        let bonus = usize::from(extra.contains(&section));
        (section, base + bonus)
    })
}

impl QuizService {
    pub fn new(questions: Arc<dyn QuestionStore>) -> Self {
        Self { questions }
    }

    pub async fn compose_quiz(&self, req: &QuizRequest) -> Result<Vec<QuizQuestionView>> {
        let mut rng = StdRng::from_entropy();
        self.compose_quiz_with_rng(req, &mut rng).await
    }

    pub async fn compose_quiz_with_rng(
        &self,
        req: &QuizRequest,
        rng: &mut StdRng,
    ) -> Result<Vec<QuizQuestionView>> {
        let allocation = allocate_sections(req.total, rng);
        let mut collected = Vec::with_capacity(req.total);

        for (section, wanted) in allocation {
            let filter = req.filter.with_section(section);
            let available = self.questions.count(&filter).await?;
            let size = wanted.min(available.max(0) as usize);
            if size == 0 {
                continue;
            }
            let sampled = self.questions.sample(&filter, size, &[]).await?;
            collected.extend(sampled);
        }

        if collected.len() < req.total {
            let needed = (req.total - collected.len()).min(BACKFILL_CAP);
            let taken: Vec<Uuid> = collected.iter().map(|q| q.id).collect();
            let fallback = self.questions.sample(&req.filter, needed, &taken).await?;
            tracing::debug!(
                shortfall = needed,
                backfilled = fallback.len(),
                "quiz sections undersupplied, backfilling"
            );
            collected.extend(fallback);
        }

        collected.shuffle(rng);
        collected.truncate(req.total);

        tracing::info!(
            class = req.filter.class,
            subject = %req.filter.subject,
            chapter = %req.filter.chapter,
            requested = req.total,
            returned = collected.len(),
            "quiz composed"
        );

        Ok(collected.iter().map(QuizQuestionView::from).collect())
    }

    /// Client-safe views for the given ids, in request order. Ids that are
    /// malformed or unknown are dropped.
    pub async fn questions_by_ids(&self, raw_ids: &[String]) -> Result<Vec<QuizQuestionView>> {
        let ids: Vec<Uuid> = raw_ids
            .iter()
            .filter_map(|id| Uuid::parse_str(id.trim()).ok())
            .collect();
        let found = self.questions.find_by_ids(&ids).await?;
        let by_id: HashMap<Uuid, _> = found.iter().map(|q| (q.id, q)).collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(id).copied())
            .map(QuizQuestionView::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{fractions_bank, question, InMemoryQuestionStore};
    use crate::models::question::QuestionFilter;
    use std::collections::HashSet;

    fn request(total: usize) -> QuizRequest {
        QuizRequest {
            filter: QuestionFilter {
                class: 6,
                subject: "Maths".into(),
                chapter: "Fractions".into(),
                section: None,
            },
            total,
        }
    }

    fn service(bank: Vec<crate::models::question::Question>) -> QuizService {
        QuizService::new(Arc::new(InMemoryQuestionStore::new(bank)))
    }

    #[test]
    fn allocation_sums_to_total() {
        let mut rng = StdRng::seed_from_u64(7);
        for total in 0..40 {
            let alloc = allocate_sections(total, &mut rng);
            assert_eq!(alloc.iter().map(|(_, n)| n).sum::<usize>(), total);
            let base = total / 3;
            assert!(alloc.iter().all(|(_, n)| *n == base || *n == base + 1));
            assert_eq!(
                alloc.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
                Section::ALL.to_vec()
            );
        }
    }

    #[test]
    fn remainder_moves_between_sections() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut lucky = HashSet::new();
        for _ in 0..200 {
            let alloc = allocate_sections(10, &mut rng);
            let (section, _) = alloc.iter().find(|(_, n)| *n == 4).copied().unwrap();
            lucky.insert(section);
        }
        assert_eq!(lucky.len(), 3);
    }

    #[tokio::test]
    async fn composes_exact_total_without_answers() {
        let svc = service(fractions_bank(10, 10, 10));
        let quiz = svc.compose_quiz(&request(10)).await.unwrap();
        assert_eq!(quiz.len(), 10);

        let ids: HashSet<Uuid> = quiz.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 10);

        for view in &quiz {
            let json = serde_json::to_value(view).unwrap();
            let obj = json.as_object().unwrap();
            assert!(!obj.contains_key("answer"));
            assert!(!obj.contains_key("correctAnswer"));
            assert!(!obj.contains_key("explanation"));
            assert!(obj.contains_key("_id"));
            assert!(obj.contains_key("type"));
        }
    }

    #[tokio::test]
    async fn uneven_pool_is_backfilled_to_full_size() {
        let svc = service(fractions_bank(4, 4, 2));
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let quiz = svc.compose_quiz_with_rng(&request(10), &mut rng).await.unwrap();
            assert_eq!(quiz.len(), 10);
            let ids: HashSet<Uuid> = quiz.iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), 10, "backfill must not duplicate questions");
        }
    }

    #[tokio::test]
    async fn small_pool_returns_everything_available() {
        let svc = service(fractions_bank(1, 0, 2));
        let quiz = svc.compose_quiz(&request(10)).await.unwrap();
        assert_eq!(quiz.len(), 3);
    }

    #[tokio::test]
    async fn empty_chapter_yields_empty_quiz() {
        let mut bank = fractions_bank(3, 3, 3);
        bank.push(question(Section::Critical, 7, "Maths", "Fractions"));
        let svc = service(bank);
        let mut req = request(10);
        req.filter.chapter = "Decimals".into();
        let quiz = svc.compose_quiz(&req).await.unwrap();
        assert!(quiz.is_empty());
    }

    #[tokio::test]
    async fn other_classes_and_sections_are_not_sampled() {
        let mut bank = fractions_bank(2, 2, 2);
        bank.push(question(Section::Memorize, 7, "Maths", "Fractions"));
        let mut stray = question(Section::Memorize, 6, "Maths", "Fractions");
        stray.section = "bonus".into();
        bank.push(stray);
        let svc = service(bank);
        let quiz = svc.compose_quiz(&request(20)).await.unwrap();
        assert_eq!(quiz.len(), 6);
        assert!(quiz.iter().all(|q| q.section != "bonus"));
    }

    #[tokio::test]
    async fn questions_by_ids_keeps_request_order_and_skips_bad_ids() {
        let bank = fractions_bank(3, 0, 0);
        let wanted = vec![
            bank[2].id.to_string(),
            "not-an-id".to_string(),
            Uuid::new_v4().to_string(),
            bank[0].id.to_string(),
        ];
        let svc = service(bank.clone());
        let views = svc.questions_by_ids(&wanted).await.unwrap();
        assert_eq!(
            views.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![bank[2].id, bank[0].id]
        );
    }
}
