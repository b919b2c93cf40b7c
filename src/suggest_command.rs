use anyhow::Result;

use crate::collaborator::WorkEntryRepository;
use crate::suggest::{match_suggestions, SuggestField, SuggestionCache};

/// `suggest`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct SuggestArgs {
    #[clap(help = "tasks, projects or categories")]
    field: SuggestField,

    #[clap(default_value = "", help = "Case-insensitive substring to match")]
    query: String,
}

/// 項目の既存の値から入力候補を表示するためのコマンド。
pub struct SuggestCommand<'a, T: WorkEntryRepository> {
    repository: &'a T,
    cache: SuggestionCache,
}

impl<'a, T: WorkEntryRepository> SuggestCommand<'a, T> {
    /// 新しい`SuggestCommand`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self {
            repository,
            cache: SuggestionCache::new(),
        }
    }

    /// `suggest`サブコマンドの処理を行う。
    pub async fn run(&mut self, args: &SuggestArgs) -> Result<Vec<String>> {
        let known = self.cache.get(self.repository, args.field).await?;

        Ok(match_suggestions(known, &args.query)
            .into_iter()
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{SuggestArgs, SuggestCommand};
    use crate::collaborator::MockWorkEntryRepository;
    use crate::suggest::SuggestField;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[clap(flatten)]
        args: SuggestArgs,
    }

    fn parse(argv: &[&str]) -> SuggestArgs {
        let argv = std::iter::once("suggest").chain(argv.iter().copied());
        TestCli::parse_from(argv).args
    }

    #[tokio::test]
    async fn test_suggest_filters_cached_values() {
        let mut repository = MockWorkEntryRepository::new();
        repository
            .expect_list_suggestions()
            .withf(|field| *field == SuggestField::Projects)
            .times(1)
            .returning(|_| {
                Ok(vec![
                    "Alpha".to_string(),
                    "beta".to_string(),
                    "Gamma".to_string(),
                ])
            });

        let mut command = SuggestCommand::new(&repository);
        let matched = command.run(&parse(&["projects", "A"])).await.unwrap();
        let all = command.run(&parse(&["projects"])).await.unwrap();

        assert_eq!(matched, vec!["Alpha", "Gamma"]);
        assert_eq!(all, vec!["Alpha", "beta", "Gamma"]);
    }
}
