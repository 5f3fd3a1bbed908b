//! Locally generated document parts.
//!
//! These blocks are plain string templates; nothing here touches the network.
//! Their wording matches the language of the fragment store.

use instructgen_shared::OperatingSystem;

/// Shell and path conventions for one operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsProfile {
    pub name: &'static str,
    pub shell: &'static str,
    pub path_separator: &'static str,
    pub venv_activate: &'static str,
}

impl OsProfile {
    pub fn for_os(os: OperatingSystem) -> Self {
        match os {
            OperatingSystem::Linux => Self {
                name: "Linux (bash shell)",
                shell: "bash",
                path_separator: "/",
                venv_activate: "source venv/bin/activate",
            },
            OperatingSystem::MacOs => Self {
                name: "macOS (zsh/bash shell)",
                shell: "zsh",
                path_separator: "/",
                venv_activate: "source venv/bin/activate",
            },
            OperatingSystem::Windows => Self {
                name: "Windows (PowerShell/cmd)",
                shell: "PowerShell",
                path_separator: "\\",
                venv_activate: "venv\\Scripts\\activate",
            },
            OperatingSystem::MultiPlatform => Self {
                name: "マルチプラットフォーム",
                shell: "bash/zsh/PowerShell",
                path_separator: "/ または \\",
                venv_activate: "source venv/bin/activate (Unix) または venv\\Scripts\\activate (Windows)",
            },
        }
    }
}

/// Document title, assistant role, project summary and the self-improvement rule.
pub fn header(project_name: &str, project_description: &str) -> String {
    format!(
        "# AI Coding Assistant Instructions\n\
         \n\
         あなたは{project_name}の専属開発アシスタントです。以下の指示に従ってコードの生成・修正やドキュメントの作成・修正を行ってください。\n\
         \n\
         ## プロジェクト概要\n\
         {project_description}\n\
         \n\
         ## 指示文改善ルール\n\
         - ユーザーの指示が「**指示文改善」で始まる場合は、この指示文ファイル自体の内容を改善してください。\n\
         - 改善時も、ファイル内の他のルールを必ず遵守すること。"
    )
}

/// Development environment block for `os`.
pub fn environment(os: OperatingSystem) -> String {
    let profile = OsProfile::for_os(os);
    format!(
        "## 開発環境情報\n\
         - **OS**: {name}\n\
         - **エディタ**: Visual Studio Code\n\
         - **ターミナル**: {shell}\n\
         \n\
         ### 環境共通の注意事項\n\
         - 絶対パスを使用してディレクトリ移動の問題を回避する\n\
         - ターミナルコマンド実行時は適切なディレクトリで実行する\n\
         - パス区切り文字: `{sep}`\n\
         - 仮想環境有効化: `{venv}`",
        name = profile.name,
        shell = profile.shell,
        sep = profile.path_separator,
        venv = profile.venv_activate,
    )
}

/// Code-quality rules. The common guidelines have no such section, so the
/// block is generated locally.
pub const CODE_QUALITY_RULES: &str = "### コード品質ルール
- **命名規約の徹底**: 意味のある名前を使用し、省略形は避ける
- **関数の単一責任**: 一つの関数は一つのことのみを行う
- **適切なコメント**: コードの「なぜ」を説明し、「何を」は避ける
- **マジックナンバー・文字列の排除**: 定数やenumを使用する
- **エラーハンドリング**: 適切な例外処理とエラーメッセージの提供
- **テスタビリティ**: テストしやすい構造でコードを設計する";
