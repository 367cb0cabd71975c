use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::diary_service::{diary_not_found, ensure_owner, ensure_visible, DiaryService, NewDiary};
use crate::{
    calendar::DateRange,
    models::{Diary, DiaryDetail, DiaryLikeInfo, UpdateDiaryInput},
    AppError, AppResult,
};

#[derive(Debug, Clone, Default)]
struct MemoryStore {
    last_id: i32,
    diaries: BTreeMap<i32, Diary>,
    deleted: BTreeSet<i32>,
    likes: BTreeSet<(i32, i32)>,
}

impl MemoryStore {
    fn find(&self, diary_id: i32) -> AppResult<&Diary> {
        if self.deleted.contains(&diary_id) {
            return Err(diary_not_found(diary_id));
        }
        self.diaries.get(&diary_id).ok_or_else(|| diary_not_found(diary_id))
    }

    fn insert(&mut self, diary: NewDiary) -> Diary {
        self.last_id += 1;
        let now = chrono::Utc::now().naive_utc();
        let created = Diary {
            id: self.last_id,
            user_id: diary.user_id,
            title: diary.title,
            content: diary.content,
            emotion: diary.emotion,
            weather: diary.weather,
            image: diary.image,
            is_public: diary.is_public,
            diary_date: diary.diary_date,
            created_at: now,
            updated_at: now,
        };
        self.diaries.insert(created.id, created.clone());
        created
    }

    fn like_info(&self, diary_id: i32, user_id: i32) -> DiaryLikeInfo {
        let like_count = self.likes.iter().filter(|(d, _)| *d == diary_id).count();
        DiaryLikeInfo {
            diary_id,
            like_count: like_count as i64,
            liked: self.likes.contains(&(diary_id, user_id)),
        }
    }

    fn user_diaries(&self, user_id: i32) -> Vec<Diary> {
        let mut diaries: Vec<Diary> = self
            .diaries
            .values()
            .filter(|d| d.user_id == user_id && !self.deleted.contains(&d.id))
            .cloned()
            .collect();
        diaries.sort_by_key(|d| (d.diary_date, d.id));
        diaries
    }
}

pub struct MemoryTx {
    store: MemoryStore,
}

/// In-process `DiaryService` whose transactions work on a snapshot and
/// replace the committed state on commit
#[derive(Default)]
pub struct MemoryDiaryService {
    committed: Mutex<MemoryStore>,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    fail_commits: AtomicBool,
    fail_creates: AtomicBool,
}

impl MemoryDiaryService {
    fn snapshot(&self) -> MemoryStore {
        self.committed.lock().unwrap().clone()
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.rollbacks.load(Ordering::SeqCst)
    }

    /// Committed diary, including soft-deleted ones
    pub fn stored_diary(&self, diary_id: i32) -> Option<Diary> {
        self.committed.lock().unwrap().diaries.get(&diary_id).cloned()
    }

    pub fn is_deleted(&self, diary_id: i32) -> bool {
        self.committed.lock().unwrap().deleted.contains(&diary_id)
    }

    pub fn diary_count(&self) -> usize {
        self.committed.lock().unwrap().diaries.len()
    }

    /// Every later commit fails and leaves the committed state untouched
    pub fn fail_commits(&self) {
        self.fail_commits.store(true, Ordering::SeqCst);
    }

    /// Every later `create_diary` fails
    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, diary: NewDiary) -> Diary {
        self.committed.lock().unwrap().insert(diary)
    }
}

#[async_trait]
impl DiaryService for MemoryDiaryService {
    type Tx = MemoryTx;

    async fn begin(&self) -> AppResult<Self::Tx> {
        Ok(MemoryTx { store: self.snapshot() })
    }

    async fn commit(&self, tx: Self::Tx) -> AppResult<()> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(AppError::Internal("commit failed".to_string()));
        }
        *self.committed.lock().unwrap() = tx.store;
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&self, _tx: Self::Tx) -> AppResult<()> {
        self.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn create_diary(&self, tx: &mut Self::Tx, diary: NewDiary) -> AppResult<Diary> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert failed".to_string()));
        }
        Ok(tx.store.insert(diary))
    }

    async fn update_diary(
        &self,
        tx: &mut Self::Tx,
        diary_id: i32,
        user_id: i32,
        input: UpdateDiaryInput,
    ) -> AppResult<()> {
        ensure_owner(tx.store.find(diary_id)?, user_id)?;

        if let Some(diary) = tx.store.diaries.get_mut(&diary_id) {
            if let Some(title) = input.title {
                diary.title = title.trim().to_string();
            }
            if let Some(content) = input.content {
                diary.content = content;
            }
            if let Some(emotion) = input.emotion {
                diary.emotion = emotion;
            }
            if let Some(weather) = input.weather {
                diary.weather = weather;
            }
            if let Some(is_public) = input.is_public {
                diary.is_public = is_public;
            }
            if let Some(diary_date) = input.diary_date {
                diary.diary_date = diary_date;
            }
            diary.updated_at = chrono::Utc::now().naive_utc();
        }

        Ok(())
    }

    async fn delete_diary(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()> {
        ensure_owner(tx.store.find(diary_id)?, user_id)?;
        tx.store.deleted.insert(diary_id);
        Ok(())
    }

    async fn read_diary_detail(
        &self,
        tx: &mut Self::Tx,
        diary_id: i32,
        viewer_id: i32,
    ) -> AppResult<DiaryDetail> {
        let diary = tx.store.find(diary_id)?.clone();
        ensure_visible(&diary, viewer_id)?;

        let likes = tx.store.like_info(diary_id, viewer_id);
        let is_mine = diary.is_owned_by(viewer_id);

        Ok(DiaryDetail {
            diary,
            like_count: likes.like_count,
            liked: likes.liked,
            is_mine,
        })
    }

    async fn create_diary_like(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()> {
        ensure_visible(tx.store.find(diary_id)?, user_id)?;
        tx.store.likes.insert((diary_id, user_id));
        Ok(())
    }

    async fn delete_diary_like(&self, tx: &mut Self::Tx, diary_id: i32, user_id: i32) -> AppResult<()> {
        tx.store.find(diary_id)?;
        tx.store.likes.remove(&(diary_id, user_id));
        Ok(())
    }

    async fn get_diary_like(&self, diary_id: i32, user_id: i32) -> AppResult<DiaryLikeInfo> {
        let store = self.snapshot();
        ensure_visible(store.find(diary_id)?, user_id)?;
        Ok(store.like_info(diary_id, user_id))
    }

    async fn list_user_diaries_between(&self, user_id: i32, range: DateRange) -> AppResult<Vec<Diary>> {
        let mut diaries = self.snapshot().user_diaries(user_id);
        diaries.retain(|d| range.contains(d.diary_date));
        Ok(diaries)
    }

    async fn read_user_diary(&self, user_id: i32) -> AppResult<Vec<Diary>> {
        let mut diaries = self.snapshot().user_diaries(user_id);
        diaries.reverse();
        Ok(diaries)
    }
}
