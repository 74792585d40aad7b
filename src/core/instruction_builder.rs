use serde::Serialize;

use crate::models::CandidateItem;

/// Opening tags the news post has to start with.
pub const HEADLINE_TAGS: [&str; 3] = ["【速報】", "【朗報】", "【悲報】"];

#[derive(Serialize)]
struct PromptItem<'a> {
    title: &'a str,
    url: &'a str,
}

/// Prompt texts sent to the text generator.
pub struct InstructionBuilder {
    pub min_chars: usize,
    pub max_chars: usize,
    pub hashtag_count: usize,
}

impl Default for InstructionBuilder {
    fn default() -> Self {
        Self {
            min_chars: 150,
            max_chars: 200,
            hashtag_count: 10,
        }
    }
}

impl InstructionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trend_words(&self) -> String {
        "Twitterのトレンドに出ていそうな日本語の単語を3〜5個生成してください。\n\
         形式は JSON で:\n\
         [\"ワード1\", \"ワード2\", ...]\n\
         のみ返すこと。"
            .to_string()
    }

    pub fn news_post(&self, candidates: &[CandidateItem], trend_words: &[String]) -> String {
        let items: Vec<PromptItem<'_>> = candidates
            .iter()
            .map(|c| PromptItem {
                title: &c.title,
                url: &c.id,
            })
            .collect();
        // Serializing a slice of borrowed strings cannot fail.
        let news = serde_json::to_string(&items).unwrap_or_default();

        let trends = if trend_words.is_empty() {
            "(なし)".to_string()
        } else {
            trend_words.join("、")
        };

        format!(
            "以下のニュース一覧から重要な1件を選び、\n\
             {min}〜{max}文字でX投稿文を作成してください。\n\
             \n\
             条件:\n\
             ・文頭は{tags}のいずれか\n\
             ・絵文字を適度に使う\n\
             ・皮肉＋JK口調で軽めのツッコミ\n\
             ・共感→ツッコミ→軽めのオチの流れ\n\
             ・ハッシュタグ禁止\n\
             ・以下のトレンドワードを自然に混ぜる（無理やりはNG）\n\
             → {trends}\n\
             \n\
             形式（このJSONだけを返すこと）:\n\
             {{\n  \"selected_url\": \"ニュースURL\",\n  \"text\": \"投稿文\"\n}}\n\
             \n\
             ニュース:\n\
             {news}",
            min = self.min_chars,
            max = self.max_chars,
            tags = HEADLINE_TAGS.join(""),
        )
    }

    pub fn hashtags(&self, word: &str) -> String {
        format!(
            "「{word}」に関連するユーモラスで自然な日本語ハッシュタグを{}個生成してください。\
             #をつけて改行で区切ってください。ハッシュタグ以外は書かないこと。",
            self.hashtag_count
        )
    }

    pub fn image(&self, word: &str) -> String {
        format!("『{word}』という日本語の単語から連想されるバズるイラストまたは写真")
    }
}
