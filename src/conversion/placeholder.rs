//! Fixed resume returned whenever conversion cannot produce a real one

use serde_json::json;

use super::models::StructuredResume;

pub fn placeholder_resume() -> StructuredResume {
    StructuredResume {
        title: "Alex Morgan - Full Stack Developer".to_string(),
        summary: json!({
            "professional_summary": "Full stack developer with over 10 years of experience in web \
development, specialized in Python, Django, JavaScript and React."
        }),
        education: json!({
            "State University": "Bachelor of Computer Science (2010-2014)"
        }),
        experience: json!([
            {
                "company": "Agile Works",
                "role": "Senior Full Stack Developer",
                "timeline": "2018 - Present",
                "description": "Building web applications with Django and React",
                "highlights": [
                    "Implemented OAuth authentication",
                    "Optimized queries, improving performance by 40%",
                    "Led a team of 5 developers"
                ]
            },
            {
                "company": "TechSolutions",
                "role": "Backend Developer",
                "timeline": "2015 - 2018",
                "description": "Built RESTful APIs in Python/Django",
                "highlights": [
                    "Designed microservices",
                    "Integrated payment systems",
                    "Set up CI/CD"
                ]
            }
        ]),
        skills: json!([
            "Python", "Django", "JavaScript", "React", "Docker", "AWS",
            "Git", "SQL", "MongoDB", "REST APIs", "Agile", "Scrum"
        ]),
        additional_information: json!({
            "languages": ["English (native)", "Portuguese (fluent)"],
            "interests": ["Open source", "Machine learning", "Hiking"],
            "availability": "Available immediately"
        }),
    }
}
