//! 컴포지션 — 한 번에 기동/해체되는 서비스 그룹
//!
//! [`Composition`]은 정의 디렉토리 하나(그 안의 정의 파일 하나)에 대응합니다.
//! 한 실행의 모든 컴포지션은 같은 프로젝트 이름을 공유하며, 프로젝트 이름은
//! 실행마다 한 번 생성되고 재사용되지 않습니다.

use std::path::{Path, PathBuf};

use crate::error::ComposeError;

/// 기동할 컴포지션 정의 (디렉토리 + 정의 파일 이름)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionDefinition {
    /// 정의 파일이 들어 있는 디렉토리
    pub dir: PathBuf,
    /// 정의 파일 이름 (예: `docker-compose.yml`)
    pub file: String,
}

impl CompositionDefinition {
    /// 새 정의를 생성합니다.
    pub fn new(dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
        }
    }

    /// 정의 파일의 전체 경로
    pub fn definition_path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }
}

/// 실행 전체에서 공유할 프로젝트 이름을 생성합니다.
///
/// 오케스트레이터가 `-`를 허용하지 않으므로 하이픈 없는 UUID를 사용합니다.
pub fn generate_project_name() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// 프로젝트 이름이 오케스트레이터 제약을 만족하는지 검증합니다.
fn validate_project_name(name: &str) -> Result<(), ComposeError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(())
    } else {
        Err(ComposeError::InvalidProjectName(name.to_owned()))
    }
}

/// 기동된 (또는 기동 중인) 컴포지션
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    project_name: String,
    definition: CompositionDefinition,
    working_dir: PathBuf,
}

impl Composition {
    /// 정의를 검증하고 컴포지션을 생성합니다.
    ///
    /// 정의 파일이 존재해야 하며, 작업 디렉토리는 정의 디렉토리의 절대 경로로 기록됩니다.
    pub fn new(
        project_name: impl Into<String>,
        definition: CompositionDefinition,
    ) -> Result<Self, ComposeError> {
        let project_name = project_name.into();
        validate_project_name(&project_name)?;

        let path = definition.definition_path();
        if !path.is_file() {
            return Err(ComposeError::DefinitionNotFound {
                path: path.display().to_string(),
            });
        }

        let working_dir = std::fs::canonicalize(&definition.dir).map_err(|_| {
            ComposeError::DefinitionNotFound {
                path: definition.dir.display().to_string(),
            }
        })?;

        Ok(Self {
            project_name,
            definition,
            working_dir,
        })
    }

    /// 실행 전체에서 공유하는 프로젝트 이름
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// 정의 디렉토리 (설정에 적힌 그대로)
    pub fn definition_dir(&self) -> &Path {
        &self.definition.dir
    }

    /// 정의 파일 이름
    pub fn definition_file(&self) -> &str {
        &self.definition.file
    }

    /// 기록된 작업 디렉토리 (절대 경로)
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// 로그 파일 이름 (`<project>.log`)
    pub fn log_file_name(&self) -> String {
        format!("{}.log", self.project_name)
    }

    /// 로그 파일 전체 경로 (작업 디렉토리 + 로그 파일 이름)
    pub fn log_path(&self) -> PathBuf {
        self.working_dir.join(self.log_file_name())
    }

    /// 로그와 에러 메시지에 쓰는 이름
    pub fn label(&self) -> String {
        self.definition.dir.display().to_string()
    }
}
