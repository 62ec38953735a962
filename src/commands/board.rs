use crate::store::StoreState;
use crate::types::{
    AnalyticsStats, BoardSnapshot, Category, CategoryCount, Priority, PriorityCount, Task,
};
use tauri::State;

/// Bucket membership is a pure function of (priority, completed) and is
/// recomputed on every call, never stored.
pub(crate) fn partition_board(tasks: &[Task]) -> BoardSnapshot {
    let mut snapshot = BoardSnapshot::default();
    for task in tasks {
        if task.completed {
            snapshot.completed.push(task.clone());
            continue;
        }
        match task.priority {
            Priority::Unset => snapshot.inbox.push(task.clone()),
            Priority::Critical => snapshot.critical.push(task.clone()),
            Priority::Important => snapshot.important.push(task.clone()),
            Priority::CanWait => snapshot.can_wait.push(task.clone()),
        }
    }
    snapshot
}

pub(crate) fn compute_analytics(tasks: &[Task]) -> AnalyticsStats {
    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let open = total - completed;
    let completion_ratio = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    };

    let priority_counts = Priority::all()
        .iter()
        .map(|priority| PriorityCount {
            priority: *priority,
            count: tasks.iter().filter(|task| task.priority == *priority).count(),
        })
        .filter(|item| item.count > 0)
        .collect();

    let category_counts = Category::all()
        .iter()
        .map(|category| CategoryCount {
            category: *category,
            count: tasks.iter().filter(|task| task.category == *category).count(),
        })
        .filter(|item| item.count > 0)
        .collect();

    AnalyticsStats {
        total,
        completed,
        open,
        completion_ratio,
        priority_counts,
        category_counts,
    }
}

#[tauri::command]
pub fn get_board_snapshot(store: State<StoreState>) -> Result<BoardSnapshot, String> {
    Ok(partition_board(store.locked()?.tasks()))
}

#[tauri::command]
pub fn get_analytics_stats(store: State<StoreState>) -> Result<AnalyticsStats, String> {
    Ok(compute_analytics(store.locked()?.tasks()))
}
