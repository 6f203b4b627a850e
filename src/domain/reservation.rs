use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookRef, ConfirmedLoan, CopyRef, LoanId, MemberSnapshot, ReservationConfirmed,
    ReservationDueExpired, ReservationId, ReservationNumber, ReservationStatus,
};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出明細 - 予約集約に所有される1タイトル分の行
///
/// 集約の外に独立した同一性を持たない。
/// `book` / `copy` は作成時の在庫スナップショットから一度だけ解決され、
/// 解決できなかった場合は空のまま永続的に変わらない（後から再解決しない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,
    pub title: String,
    pub copy_number: Option<String>,
    pub book: Option<BookRef>,
    pub copy: Option<CopyRef>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// 予約集約 - 予約本体と所有する貸出明細の並び
///
/// 不変条件：
/// - `number` は一意で、受信メッセージとの唯一の相関キー
/// - 同じ番号の2通目のリクエストは既存集約の更新（重複作成しない）
/// - `member` は最初のリクエストで確定し、以後上書きされない
/// - `request_date` は作成時に確定し不変
/// - `loans` の並びはリクエストの明細順（作成後の並べ替えなし）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_id: ReservationId,
    pub number: ReservationNumber,
    pub member: MemberSnapshot,
    pub status: ReservationStatus,
    pub request_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub loans: Vec<Loan>,
}

/// 在庫解決済みの明細 - 純粋関数への入力
///
/// 在庫照合はI/Oなのでアプリケーション層で行い、
/// 結果だけをこの形で状態遷移関数に渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub title: String,
    pub copy_number: Option<String>,
    pub book: Option<BookRef>,
    pub copy: Option<CopyRef>,
}

/// 解決済み明細から貸出明細の並びを構築する
///
/// 返却期限はリクエスト時点から固定の貸出期間で一律に計算される。
/// 在庫ミス（book/copy が None）はエラーではなく、参照が空の明細になる。
fn build_loans(items: Vec<ResolvedItem>, requested_at: DateTime<Utc>) -> Vec<Loan> {
    let due_date = requested_at + Duration::days(LOAN_PERIOD_DAYS);
    items
        .into_iter()
        .map(|item| Loan {
            loan_id: LoanId::new(),
            title: item.title,
            copy_number: item.copy_number,
            book: item.book,
            copy: item.copy,
            due_date,
            return_date: None,
        })
        .collect()
}

/// 確定イベントを集約の現在状態から構築する
fn build_confirmation(reservation: &Reservation) -> ReservationConfirmed {
    ReservationConfirmed {
        reservation_id: reservation.reservation_id,
        number: reservation.number.as_str().to_string(),
        member: reservation.member.clone(),
        loans: reservation
            .loans
            .iter()
            .map(|loan| ConfirmedLoan {
                loan_id: loan.loan_id,
                title: loan.title.clone(),
                copy_number: loan.copy_number.clone(),
                due_date: loan.due_date,
                book_resolved: loan.book.is_some(),
                copy_resolved: loan.copy.is_some(),
            })
            .collect(),
    }
}

/// 純粋関数：予約リクエストを適用する
///
/// ビジネスルール：
/// - 既存集約がなければ `Requested` で新規作成、あれば更新
/// - 更新時も会員スナップショットと `request_date` は保持される
/// - 明細は新規・更新ともリクエストの明細から再構築される（解決方針は作成時と同一）
/// - 在庫ミスでリクエストが失敗することはない
///
/// 副作用なし。新しい集約と確定イベントを返す。
pub fn request_reservation(
    existing: Option<Reservation>,
    number: ReservationNumber,
    member: MemberSnapshot,
    items: Vec<ResolvedItem>,
    requested_at: DateTime<Utc>,
) -> (Reservation, ReservationConfirmed) {
    let reservation = match existing {
        None => Reservation {
            reservation_id: ReservationId::new(),
            number,
            member,
            status: ReservationStatus::Requested,
            request_date: requested_at,
            updated_at: requested_at,
            loans: build_loans(items, requested_at),
        },
        // 会員スナップショットは最初のリクエストのものを保持する
        Some(current) => Reservation {
            updated_at: requested_at,
            loans: build_loans(items, requested_at),
            ..current
        },
    };

    let event = build_confirmation(&reservation);

    (reservation, event)
}

/// 純粋関数：返却を適用する
///
/// ビジネスルール：
/// - 各明細の `return_date` は未設定の場合のみ記録する（2通目は触らない）
/// - ステータスは事前状態に関わらず `Delivered` に上書きする
///   （本が物理的に返った事実は Cancelled / Expired より優先する）
///
/// 副作用なし。同じタイムスタンプの再適用は同一の集約を返す（冪等）。
pub fn return_reservation(reservation: Reservation, returned_at: DateTime<Utc>) -> Reservation {
    let loans = reservation
        .loans
        .into_iter()
        .map(|loan| Loan {
            return_date: loan.return_date.or(Some(returned_at)),
            ..loan
        })
        .collect();

    Reservation {
        status: ReservationStatus::Delivered,
        updated_at: returned_at,
        loans,
        ..reservation
    }
}

/// 純粋関数：期限切れを適用する
///
/// ビジネスルール：
/// - ステータスは事前状態に関わらず `Expired` に上書きする
///   （期日が過ぎた事実は Delivered / Cancelled より優先する）
/// - 既に `Expired` の場合は完全な no-op
///
/// 副作用なし。Return と Expire は後勝ちで、どちらも相手を巻き戻さない。
pub fn expire_reservation(reservation: Reservation, expired_at: DateTime<Utc>) -> Reservation {
    if reservation.status == ReservationStatus::Expired {
        return reservation;
    }

    Reservation {
        status: ReservationStatus::Expired,
        updated_at: expired_at,
        ..reservation
    }
}

/// 純粋関数：期限判定の境界時刻を計算する
///
/// 「現在時刻の翌日 00:00（UTC）」を返す。返却期限がこの時刻より
/// 厳密に前の明細、つまり今日以前が期日の明細だけが期限切れ候補になる。
pub fn due_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now.date_naive() + Duration::days(1);
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

/// 純粋関数：期限切れ候補の判定
///
/// 未返却かつ返却期限が境界より前の明細が1つでもあれば真。
/// 候補が複数明細でも通知は予約ごとに1件に抑える（判定のみ）。
pub fn has_due_loans(reservation: &Reservation, cutoff: DateTime<Utc>) -> bool {
    reservation
        .loans
        .iter()
        .any(|loan| loan.return_date.is_none() && loan.due_date < cutoff)
}

/// 期限切れ通知イベントを構築する
pub fn due_expired_notice(reservation: &Reservation) -> ReservationDueExpired {
    ReservationDueExpired {
        reservation_id: reservation.reservation_id,
        number: reservation.number.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookId, CopyId, MemberId};

    fn member(name: &str) -> MemberSnapshot {
        MemberSnapshot {
            id: MemberId::new(),
            document_id: "DOC-42".to_string(),
            name: name.to_string(),
        }
    }

    fn resolved_item(title: &str) -> ResolvedItem {
        ResolvedItem {
            title: title.to_string(),
            copy_number: Some("001".to_string()),
            book: Some(BookRef { book_id: BookId::new() }),
            copy: Some(CopyRef { copy_id: CopyId::new() }),
        }
    }

    fn requested(now: DateTime<Utc>) -> Reservation {
        let (reservation, _) = request_reservation(
            None,
            ReservationNumber::new("RSV-0001"),
            member("Alice"),
            vec![resolved_item("Dune")],
            now,
        );
        reservation
    }

    // request_reservation のテスト

    #[test]
    fn test_request_creates_reservation_in_requested_status() {
        let now = Utc::now();
        let (reservation, event) = request_reservation(
            None,
            ReservationNumber::new("RSV-0001"),
            member("Alice"),
            vec![resolved_item("Dune")],
            now,
        );

        assert_eq!(reservation.status, ReservationStatus::Requested);
        assert_eq!(reservation.request_date, now);
        assert_eq!(reservation.updated_at, now);
        assert_eq!(reservation.loans.len(), 1);
        assert_eq!(reservation.loans[0].title, "Dune");
        assert_eq!(
            reservation.loans[0].due_date,
            now + Duration::days(LOAN_PERIOD_DAYS)
        );
        assert_eq!(reservation.loans[0].return_date, None);

        // 確定イベントの検証
        assert_eq!(event.reservation_id, reservation.reservation_id);
        assert_eq!(event.number, "RSV-0001");
        assert_eq!(event.loans.len(), 1);
        assert!(event.loans[0].book_resolved);
        assert!(event.loans[0].copy_resolved);
    }

    #[test]
    fn test_request_preserves_item_order() {
        let now = Utc::now();
        let (reservation, _) = request_reservation(
            None,
            ReservationNumber::new("RSV-0001"),
            member("Alice"),
            vec![
                resolved_item("Dune"),
                resolved_item("Neuromancer"),
                resolved_item("Hyperion"),
            ],
            now,
        );

        let titles: Vec<&str> = reservation.loans.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Dune", "Neuromancer", "Hyperion"]);
    }

    #[test]
    fn test_request_with_unresolved_book_keeps_text_and_empty_refs() {
        let now = Utc::now();
        let item = ResolvedItem {
            title: "Unknown Book".to_string(),
            copy_number: Some("001".to_string()),
            book: None,
            copy: None,
        };
        let (reservation, event) = request_reservation(
            None,
            ReservationNumber::new("RSV-0001"),
            member("Alice"),
            vec![item],
            now,
        );

        // 在庫ミスでも明細は作られ、テキストは保存される
        let loan = &reservation.loans[0];
        assert_eq!(loan.title, "Unknown Book");
        assert_eq!(loan.copy_number.as_deref(), Some("001"));
        assert!(loan.book.is_none());
        assert!(loan.copy.is_none());

        assert!(!event.loans[0].book_resolved);
        assert!(!event.loans[0].copy_resolved);
    }

    #[test]
    fn test_request_with_unresolved_copy_keeps_book_ref_only() {
        let now = Utc::now();
        let item = ResolvedItem {
            title: "Dune".to_string(),
            copy_number: Some("999".to_string()),
            book: Some(BookRef { book_id: BookId::new() }),
            copy: None,
        };
        let (reservation, event) = request_reservation(
            None,
            ReservationNumber::new("RSV-0001"),
            member("Alice"),
            vec![item],
            now,
        );

        assert!(reservation.loans[0].book.is_some());
        assert!(reservation.loans[0].copy.is_none());
        assert!(event.loans[0].book_resolved);
        assert!(!event.loans[0].copy_resolved);
    }

    #[test]
    fn test_second_request_updates_existing_aggregate() {
        let now = Utc::now();
        let first = requested(now);
        let later = now + Duration::days(1);

        let (updated, event) = request_reservation(
            Some(first.clone()),
            first.number.clone(),
            first.member.clone(),
            vec![resolved_item("Dune")],
            later,
        );

        // 同じ集約の更新であり、重複作成ではない
        assert_eq!(updated.reservation_id, first.reservation_id);
        assert_eq!(updated.number, first.number);
        assert_eq!(updated.request_date, first.request_date);
        assert_eq!(updated.updated_at, later);
        // 明細は再構築され、新しい期限を持つ
        assert_ne!(updated.loans[0].loan_id, first.loans[0].loan_id);
        assert_eq!(
            updated.loans[0].due_date,
            later + Duration::days(LOAN_PERIOD_DAYS)
        );

        assert_eq!(event.reservation_id, first.reservation_id);
    }

    #[test]
    fn test_second_request_does_not_overwrite_member_snapshot() {
        let now = Utc::now();
        let first = requested(now);
        let intruder = member("Mallory");

        // 別の会員名・IDを運ぶ2通目
        let (updated, _) = request_reservation(
            Some(first.clone()),
            first.number.clone(),
            intruder.clone(),
            vec![resolved_item("Dune")],
            now + Duration::days(1),
        );

        assert_eq!(updated.member, first.member);
        assert_ne!(updated.member, intruder);
    }

    // return_reservation のテスト

    #[test]
    fn test_return_sets_return_date_and_forces_delivered() {
        let now = Utc::now();
        let reservation = requested(now);
        let returned_at = now + Duration::days(3);

        let returned = return_reservation(reservation, returned_at);

        assert_eq!(returned.status, ReservationStatus::Delivered);
        assert_eq!(returned.loans[0].return_date, Some(returned_at));
        assert_eq!(returned.updated_at, returned_at);
    }

    #[test]
    fn test_return_is_idempotent() {
        let now = Utc::now();
        let reservation = requested(now);
        let returned_at = now + Duration::days(3);

        let once = return_reservation(reservation, returned_at);
        let twice = return_reservation(once.clone(), returned_at);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_return_never_overwrites_return_date() {
        let now = Utc::now();
        let reservation = requested(now);
        let first_return = now + Duration::days(3);
        let second_return = now + Duration::days(5);

        let once = return_reservation(reservation, first_return);
        let twice = return_reservation(once, second_return);

        // 2通目のタイムスタンプでは上書きされない
        assert_eq!(twice.loans[0].return_date, Some(first_return));
    }

    #[test]
    fn test_return_overrides_any_prior_status() {
        let now = Utc::now();
        for prior in [
            ReservationStatus::Requested,
            ReservationStatus::Delivered,
            ReservationStatus::Cancelled,
            ReservationStatus::Expired,
        ] {
            let mut reservation = requested(now);
            reservation.status = prior;

            let returned = return_reservation(reservation, now + Duration::days(3));
            assert_eq!(returned.status, ReservationStatus::Delivered);
        }
    }

    // expire_reservation のテスト

    #[test]
    fn test_expire_overrides_any_prior_status() {
        let now = Utc::now();
        for prior in [
            ReservationStatus::Requested,
            ReservationStatus::Delivered,
            ReservationStatus::Cancelled,
            ReservationStatus::Expired,
        ] {
            let mut reservation = requested(now);
            reservation.status = prior;

            let expired = expire_reservation(reservation, now + Duration::days(20));
            assert_eq!(expired.status, ReservationStatus::Expired);
        }
    }

    #[test]
    fn test_expire_is_noop_when_already_expired() {
        let now = Utc::now();
        let expired = expire_reservation(requested(now), now + Duration::days(20));
        let again = expire_reservation(expired.clone(), now + Duration::days(25));

        assert_eq!(expired, again);
    }

    #[test]
    fn test_return_then_expire_last_writer_wins() {
        let now = Utc::now();
        let reservation = requested(now);

        let returned = return_reservation(reservation, now + Duration::days(3));
        let expired = expire_reservation(returned, now + Duration::days(20));

        assert_eq!(expired.status, ReservationStatus::Expired);
        // 返却日は巻き戻らない
        assert!(expired.loans[0].return_date.is_some());
    }

    #[test]
    fn test_expire_then_return_last_writer_wins() {
        let now = Utc::now();
        let reservation = requested(now);

        let expired = expire_reservation(reservation, now + Duration::days(20));
        let returned = return_reservation(expired, now + Duration::days(21));

        assert_eq!(returned.status, ReservationStatus::Delivered);
    }

    // due_cutoff / has_due_loans のテスト

    #[test]
    fn test_due_cutoff_is_start_of_next_day() {
        let now = "2026-08-29T15:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let cutoff = due_cutoff(now);
        assert_eq!(cutoff, "2026-08-30T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn test_loan_due_now_qualifies() {
        let now = Utc::now();
        let mut reservation = requested(now);
        reservation.loans[0].due_date = now;

        assert!(has_due_loans(&reservation, due_cutoff(now)));
    }

    #[test]
    fn test_loan_due_one_minute_before_cutoff_qualifies() {
        let now = Utc::now();
        let mut reservation = requested(now);
        reservation.loans[0].due_date = due_cutoff(now) - Duration::minutes(1);

        assert!(has_due_loans(&reservation, due_cutoff(now)));
    }

    #[test]
    fn test_loan_due_exactly_at_cutoff_does_not_qualify() {
        let now = Utc::now();
        let mut reservation = requested(now);
        reservation.loans[0].due_date = due_cutoff(now);

        assert!(!has_due_loans(&reservation, due_cutoff(now)));
    }

    #[test]
    fn test_loan_due_one_minute_after_cutoff_does_not_qualify() {
        let now = Utc::now();
        let mut reservation = requested(now);
        reservation.loans[0].due_date = due_cutoff(now) + Duration::minutes(1);

        assert!(!has_due_loans(&reservation, due_cutoff(now)));
    }

    #[test]
    fn test_returned_loan_is_not_a_due_candidate() {
        let now = Utc::now();
        let mut reservation = requested(now);
        reservation.loans[0].due_date = now;
        reservation.loans[0].return_date = Some(now);

        assert!(!has_due_loans(&reservation, due_cutoff(now)));
    }

    #[test]
    fn test_any_single_due_loan_qualifies_the_reservation() {
        let now = Utc::now();
        let (mut reservation, _) = request_reservation(
            None,
            ReservationNumber::new("RSV-0001"),
            member("Alice"),
            vec![resolved_item("Dune"), resolved_item("Hyperion")],
            now,
        );
        // 片方だけ期限切れ
        reservation.loans[1].due_date = now;

        assert!(has_due_loans(&reservation, due_cutoff(now)));
    }
}
