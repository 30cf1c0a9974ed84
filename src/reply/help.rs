use super::Locale;

const HELP_ZH_TW: &str = "🤖 LINE 任務管理機器人 - 指令說明

📝 創建任務:
/add 任務標題 #標籤 @優先級 :負責人
範例: /add 修正登入 bug #mobile @high :john
創建任務：標題 | 優先級：高 | 負責人：張三 | 截止日期：7月11日
（也可以換行，每行一個「欄位：值」）

📋 查看任務:
/list - 顯示所有任務
/list status:todo - 顯示待辦任務
範例: 查看任務

🔍 搜尋任務:
/search 關鍵字
範例: 搜尋：登入

✏️ 更新任務:
/update 任務ID @urgent status:in-progress

✅ 完成任務:
/done 任務ID

🗑️ 刪除任務:
/delete 任務ID

💡 其他:
/help - 顯示此幫助訊息";

const HELP_EN: &str = "🤖 LINE Task Bot - Commands

📝 Create a task:
/add Title #tag @priority :assignee
Example: /add Fix login bug #mobile @high :john
create task: Title | priority: high | assignee: Amy | due: 2026-07-11
(or one \"field: value\" per line)

📋 List tasks:
/list - show all tasks
/list status:todo - show tasks to do
Example: list status:in-progress

🔍 Search tasks:
/search keyword
Example: search: login

✏️ Update a task:
/update TASK_ID @urgent status:in-progress

✅ Complete a task:
/done TASK_ID

🗑️ Delete a task:
/delete TASK_ID

💡 Other:
/help - show this message";

const FOLLOW_ZH_TW: &str = "🎉 歡迎使用 LINE 任務管理機器人！

我可以幫您管理任務，支援以下功能：
• 創建任務
• 查看任務列表
• 搜尋任務
• 更新和刪除任務

輸入 /help 查看詳細指令說明
輸入 /add 開始創建您的第一個任務吧！";

const FOLLOW_EN: &str = "🎉 Welcome to the LINE Task Bot!

I can help you manage tasks:
• Create tasks
• List tasks
• Search tasks
• Update and delete tasks

Send /help for the full command list
Send /add to create your first task!";

const JOIN_ZH_TW: &str = "👋 大家好！我是任務管理機器人

我可以幫助團隊管理任務：
• 任何人都可以創建和查看任務
• 支援任務指派和標籤分類
• 可以搜尋和篩選任務

輸入 /help 查看使用說明";

const JOIN_EN: &str = "👋 Hi everyone! I'm the task bot

I help teams keep track of work:
• Anyone can create and view tasks
• Tasks can be assigned and tagged
• Tasks can be searched and filtered

Send /help to see how to use me";

pub(super) fn help_text(locale: Locale) -> &'static str {
    match locale {
        Locale::ZhTw => HELP_ZH_TW,
        Locale::En => HELP_EN,
    }
}

pub(super) fn follow_text(locale: Locale) -> &'static str {
    match locale {
        Locale::ZhTw => FOLLOW_ZH_TW,
        Locale::En => FOLLOW_EN,
    }
}

pub(super) fn join_text(locale: Locale) -> &'static str {
    match locale {
        Locale::ZhTw => JOIN_ZH_TW,
        Locale::En => JOIN_EN,
    }
}
