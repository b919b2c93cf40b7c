//! 作業記録を週のタイムラインに配置し、期間ごとの作業時間を集計する。
//!
//! 作業記録の保存やCSVの生成は外部のAPIが担い、このクレートは`collaborator`を通してのみ利用する。

pub mod bulk_delete;
pub mod collaborator;
pub mod colors;
pub mod config;
pub mod console;
pub mod datetime;
pub mod entry_command;
pub mod error;
pub mod export_command;
pub mod logger;
pub mod purge_command;
pub mod range;
pub mod report;
pub mod report_command;
pub mod suggest;
pub mod suggest_command;
pub mod timeline;
pub mod timeline_command;
pub mod track_command;
pub mod view;
pub mod work_entry;
