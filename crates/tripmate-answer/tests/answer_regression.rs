use tripmate_answer::{
    format_answer, AnswerMarkers, Coordinate, Distance, PlaceRecord, PlanOutcome,
};

const SAMPLE_ANSWER: &str = "**추천 관광지:**
- 관광지 이름: 수원화성
  - 주소: 경기도 수원시 팔달구 정조로 825
  - 주요 시설/특징: 조선 후기 성곽
  - 사용자 위치 기준 거리(km): 약 30km
- 관광지 이름: 한국민속촌
  - 주소: 경기도 용인시 기흥구 민속촌로 90
  - 주요 시설/특징: 전통 민속 체험
- 관광지 이름: 수원화성
  - 주소: 경기도 수원시 팔달구 정조로 825

**상세 여행 계획 (2일):**
| 일차 | 시간 | 활동 | 예상 장소 | 이동 방법 |
|---|---|---|---|---|
| 1일차 | 오전 (9:00 - 12:00) | 성곽 걷기 | 수원화성 | 지하철 1시간 |
| 1일차 | 점심 (12:00 - 13:00) | 식사 | 수원 통닭거리 | 도보 10분 |
| 2일차 | 오전 (9:00 - 12:00) | 민속 체험 | 한국민속촌 | 버스 40분 |
| | 오후 (13:00 - 17:00) | 공연 관람 | 한국민속촌 | - |
- 관광지 이름: 이건 계획 안쪽";

fn catalog() -> Vec<PlaceRecord> {
    vec![
        PlaceRecord {
            name: "수원화성".to_string(),
            address: "경기도 수원시 팔달구 정조로 825".to_string(),
            latitude: Some(37.2871),
            longitude: Some(127.0119),
        },
        PlaceRecord {
            name: "한국민속촌".to_string(),
            address: "경기도 용인시 기흥구 민속촌로 90".to_string(),
            latitude: None,
            longitude: None,
        },
    ]
}

#[test]
fn test_full_answer_is_formatted() {
    let places = catalog();
    let lookup = |name: &str| tripmate_answer::place::find_by_name(&places, name).cloned();
    let user = Coordinate::new(37.5665, 126.9780);
    let out = format_answer(SAMPLE_ANSWER, &lookup, user, &AnswerMarkers::default());

    // One name line and one distance line per unique place.
    assert_eq!(out.text.matches("관광지 이름: 수원화성").count(), 1);
    assert_eq!(out.text.matches("관광지 이름: 한국민속촌").count(), 1);
    assert_eq!(out.text.matches("거리(km):").count(), 2);
    assert!(!out.text.contains("약 30km"));
    assert!(!out.text.contains("이건 계획 안쪽"));

    assert_eq!(out.recommendations.len(), 2);
    assert_eq!(out.recommendations[0].place_name, "수원화성");
    assert!(matches!(out.recommendations[0].distance, Distance::Km(_)));
    assert_eq!(out.recommendations[1].place_name, "한국민속촌");
    assert_eq!(out.recommendations[1].distance, Distance::Unavailable);

    let PlanOutcome::Table { table, warnings } = &out.plan else {
        panic!("expected a plan table, got {:?}", out.plan);
    };
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    assert_eq!(
        table.columns,
        vec!["일차", "시간", "활동", "예상 장소", "이동 방법"]
    );
    let days: Vec<&str> = (0..table.rows.len())
        .map(|i| table.cell(i, "일차").unwrap())
        .collect();
    assert_eq!(days, vec!["1일차", "", "2일차", ""]);
    assert_eq!(table.cell(3, "활동"), Some("공연 관람"));
}

#[test]
fn test_custom_markers_drive_the_same_pipeline() {
    let markers = AnswerMarkers {
        plan_heading: "Itinerary".to_string(),
        place_name: regex_for("Place:"),
        distance_label: "Distance(km):".to_string(),
        day_column: "Day".to_string(),
        distance_prefix: "- Distance(km):".to_string(),
        distance_unavailable: "unknown".to_string(),
    };
    let raw = "Place: Gyeongbokgung\nPlace: Gyeongbokgung\nDistance(km): 3\nItinerary\n| Day | Time |\n|---|---|\n| Day 1 | AM |\n| Day 1 | PM |";
    let out = format_answer(raw, &no_places, Coordinate::new(37.5, 127.0), &markers);

    assert_eq!(
        out.text,
        "Place: Gyeongbokgung\n- Distance(km): unknown\nItinerary"
    );
    assert_eq!(out.plan_rows().len(), 2);
    assert_eq!(out.plan_table().unwrap().cell(1, "Day"), Some(""));
}

fn no_places(_: &str) -> Option<PlaceRecord> {
    None
}

fn regex_for(label: &str) -> regex::Regex {
    regex::Regex::new(&format!(r"{}\s*(.+)", regex::escape(label))).unwrap()
}
