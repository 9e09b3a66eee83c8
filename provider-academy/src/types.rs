//! Catalog payload types
//!
//! Data structures for deserializing catalog responses and their translation
//! into cache entities. List payloads are wrapped in an object
//! (`{"courses": [...]}`, `{"modules": [...]}`).

use core_catalog::{ContentEntity, CourseEntity, ModuleEntity};
use serde::{Deserialize, Serialize};

/// A course as published by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Deadline label
    #[serde(default)]
    pub date: String,

    #[serde(default)]
    pub image_path: String,

    #[serde(default)]
    pub total_modules: i32,
}

/// A module entry of a course listing
///
/// Asset files omit `courseId`; the source fills it from the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleResponse {
    pub module_id: String,

    #[serde(default)]
    pub course_id: String,

    pub title: String,

    #[serde(default)]
    pub position: i32,
}

/// Body of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    #[serde(default)]
    pub module_id: String,

    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseListResponse {
    pub courses: Vec<CourseResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModuleListResponse {
    pub modules: Vec<ModuleResponse>,
}

impl ModuleResponse {
    pub(crate) fn for_course(mut self, course_id: &str) -> Self {
        if self.course_id.is_empty() {
            self.course_id = course_id.to_string();
        }
        self
    }
}

impl ContentResponse {
    pub(crate) fn for_module(mut self, module_id: &str) -> Self {
        if self.module_id.is_empty() {
            self.module_id = module_id.to_string();
        }
        self
    }
}

impl From<CourseResponse> for CourseEntity {
    fn from(response: CourseResponse) -> Self {
        CourseEntity::new(
            response.id,
            response.title,
            response.description,
            response.date,
            response.total_modules,
            response.image_path,
        )
    }
}

impl From<ModuleResponse> for ModuleEntity {
    fn from(response: ModuleResponse) -> Self {
        ModuleEntity::new(
            response.module_id,
            response.course_id,
            response.title,
            response.position,
        )
    }
}

impl From<ContentResponse> for ContentEntity {
    fn from(response: ContentResponse) -> Self {
        ContentEntity::new(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_list_deserialization() {
        let json = r#"{
            "courses": [
                {
                    "id": "c1",
                    "title": "Algorithms",
                    "description": "Sorting and searching",
                    "date": "100 Hari",
                    "imagePath": "https://example.com/a.jpg",
                    "totalModules": 7
                },
                { "id": "c2", "title": "Databases" }
            ]
        }"#;

        let list: CourseListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(list.courses.len(), 2);
        assert_eq!(list.courses[0].image_path, "https://example.com/a.jpg");
        assert_eq!(list.courses[0].total_modules, 7);
        assert_eq!(list.courses[1].description, "");
    }

    #[test]
    fn test_course_translation_is_unbookmarked() {
        let response = CourseResponse {
            id: "c1".to_string(),
            title: "Algorithms".to_string(),
            description: "Sorting".to_string(),
            date: "100 Hari".to_string(),
            image_path: "a.jpg".to_string(),
            total_modules: 7,
        };

        let entity = CourseEntity::from(response);
        assert_eq!(entity.deadline, "100 Hari");
        assert_eq!(entity.module_count, 7);
        assert!(!entity.bookmarked);
    }

    #[test]
    fn test_module_fills_missing_course_id() {
        let json = r#"{ "moduleId": "m1", "title": "Intro", "position": 0 }"#;
        let response: ModuleResponse = serde_json::from_str(json).unwrap();

        let entity = ModuleEntity::from(response.for_course("c1"));
        assert_eq!(entity.course_id, "c1");
        assert!(!entity.read);
        assert!(entity.content.is_none());
    }

    #[test]
    fn test_module_keeps_explicit_course_id() {
        let response = ModuleResponse {
            module_id: "m1".to_string(),
            course_id: "c7".to_string(),
            title: "Intro".to_string(),
            position: 0,
        };
        assert_eq!(response.for_course("c1").course_id, "c7");
    }

    #[test]
    fn test_content_fills_missing_module_id() {
        let response: ContentResponse =
            serde_json::from_str(r#"{ "content": "<h3>Intro</h3>" }"#).unwrap();
        let response = response.for_module("m1");

        assert_eq!(response.module_id, "m1");
        assert_eq!(ContentEntity::from(response).content, "<h3>Intro</h3>");
    }
}
