use std::cell::RefCell;
use tripmate_answer::{
    AgeBand, Distance, PlaceRecord, PlanOutcome, QueryError, TravelStyle, UserQuery,
};
use tripmate_core::index::Retriever;
use tripmate_core::llm::{Generator, LlmError};
use tripmate_core::pipeline::Recommender;
use tripmate_core::places::PlaceCatalog;
use tripmate_core::session::{Session, SessionStore};
use tripmate_core::TripmateError;

const ANSWER: &str = "- 관광지 이름: 수원화성
  - 주소: 경기도 수원시 팔달구 정조로 825
- 관광지 이름: 수원화성

**상세 여행 계획:**
| 일차 | 시간 | 활동 | 예상 장소 | 이동 방법 |
|---|---|---|---|---|
| 1일차 | 오전 | 성곽 걷기 | 수원화성 | 지하철 |
| 1일차 | 오후 | 야경 | 화서문 | 도보 |";

struct FixedRetriever;

impl Retriever for FixedRetriever {
    fn retrieve(&self, _question: &str, k: usize) -> Result<Vec<String>, TripmateError> {
        Ok(vec!["관광지명: 수원화성".to_string(), "관광지명: 한국민속촌".to_string()]
            .into_iter()
            .take(k)
            .collect())
    }
}

/// Returns a canned answer and keeps the prompts it was given.
struct ScriptedGenerator {
    answer: Option<&'static str>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedGenerator {
    fn answering(answer: &'static str) -> Self {
        Self {
            answer: Some(answer),
            prompts: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            answer: None,
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl Generator for ScriptedGenerator {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answer.map(str::to_string).ok_or(LlmError::Api {
            status: 500,
            message: "upstream unavailable".to_string(),
        })
    }
}

fn catalog() -> PlaceCatalog {
    PlaceCatalog::from_records(vec![PlaceRecord {
        name: "수원화성".to_string(),
        address: "경기도 수원시 팔달구 정조로 825".to_string(),
        latitude: Some(37.2871),
        longitude: Some(127.0119),
    }])
}

fn query() -> UserQuery {
    UserQuery {
        age_band: AgeBand::Thirties,
        travel_styles: [TravelStyle::History].into_iter().collect(),
        question: "수원에서 역사 여행".to_string(),
        duration_days: 1,
        ..UserQuery::default()
    }
}

#[test]
fn test_recommend_formats_and_records() {
    let generator = ScriptedGenerator::answering(ANSWER);
    let recommender = Recommender::new(catalog(), FixedRetriever, &generator, 15);
    let mut session = Session::new();

    let answer = recommender.recommend(&mut session, query()).unwrap();

    assert_eq!(answer.recommendations.len(), 1);
    assert!(matches!(answer.recommendations[0].distance, Distance::Km(km) if km > 20.0));
    assert_eq!(answer.plan_rows().len(), 2);
    assert_eq!(answer.plan_rows()[1].cells()[0], "");

    let prompts = generator.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("관광지명: 수원화성\n\n관광지명: 한국민속촌"));
    assert!(prompts[0].contains("나이대: 30대"));
    assert!(prompts[0].contains("수원에서 역사 여행"));

    assert_eq!(session.len(), 1);
    assert_eq!(session.records()[0].raw_answer, ANSWER);
    assert_eq!(session.records()[0].style_label, "역사");
}

#[test]
fn test_invalid_query_never_reaches_the_model() {
    let generator = ScriptedGenerator::answering(ANSWER);
    let recommender = Recommender::new(catalog(), FixedRetriever, &generator, 15);
    let mut session = Session::new();

    let bad = UserQuery {
        latitude: 0.0,
        longitude: 0.0,
        ..query()
    };
    let result = recommender.recommend(&mut session, bad);
    assert!(matches!(
        result,
        Err(TripmateError::Query(QueryError::InvalidLocation))
    ));

    let blank = UserQuery {
        question: "   ".to_string(),
        ..query()
    };
    assert!(recommender.recommend(&mut session, blank).is_err());

    assert!(generator.prompts.borrow().is_empty());
    assert!(session.is_empty());
}

#[test]
fn test_generation_failure_records_nothing() {
    let generator = ScriptedGenerator::failing();
    let recommender = Recommender::new(catalog(), FixedRetriever, &generator, 15);
    let mut session = Session::new();

    let result = recommender.recommend(&mut session, query());
    match result {
        Err(TripmateError::Generation(LlmError::Api { status, .. })) => assert_eq!(status, 500),
        other => panic!("expected a generation error, got {:?}", other.map(|a| a.text)),
    }
    assert!(session.is_empty());
}

#[test]
fn test_review_uses_the_stored_location() {
    let generator = ScriptedGenerator::answering(ANSWER);
    let recommender = Recommender::new(catalog(), FixedRetriever, &generator, 15);
    let mut session = Session::new();

    let near = UserQuery {
        latitude: 37.2871,
        longitude: 127.0119,
        ..query()
    };
    recommender.recommend(&mut session, near).unwrap();
    recommender.recommend(&mut session, query()).unwrap();

    let reviewed = recommender.review(session.select(0).unwrap());
    assert_eq!(reviewed.recommendations[0].distance, Distance::Km(0.0));
    assert!(reviewed.text.contains("약 **0.00** km"));
}

#[test]
fn test_history_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path().join("history.json"));
    let generator = ScriptedGenerator::answering(ANSWER);
    let recommender = Recommender::new(catalog(), FixedRetriever, &generator, 15);

    let mut session = store.load().unwrap();
    recommender.recommend(&mut session, query()).unwrap();
    store.save(&session).unwrap();

    let mut restored = store.load().unwrap();
    assert_eq!(restored.len(), 1);
    let record = restored.select(0).unwrap().clone();
    let reviewed = recommender.review(&record);
    assert!(matches!(reviewed.plan, PlanOutcome::Table { .. }));
    assert_eq!(
        restored.previews(),
        vec![(0, "성향: 역사\n질문: 수원에서 역사 여행".to_string())]
    );
}
