//! services/api/src/adapters/seed.rs
//!
//! Builds the demo dataset the in-memory store starts from. The dataset is a
//! pure function of the seed and the reference time, so two stores built with
//! the same inputs hold identical records.

use campify_core::domain::{
    Assignment, Attendance, AttendanceStatus, Course, Grade, Payment, PaymentStatus, Profile,
    ReportComment, SharedReport, Timetable, TimetableSlot, User, Weekday, TIME_SLOTS,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::collections::HashMap;

const TOTAL_STUDENTS: usize = 70;
const SEMESTER: &str = "Fall 2024";
const FEE_AMOUNT: f64 = 5500.0;

const TEACHERS: [(&str, &str); 5] = [
    ("user-teacher-1", "Dr. Evelyn Reed"),
    ("user-teacher-2", "Emvy Stone"),
    ("user-teacher-3", "Mary Bloom"),
    ("user-teacher-4", "Max Sterling"),
    ("user-teacher-5", "Dr. Alan Grant"),
];

const COURSES: [(&str, &str, &str); 6] = [
    ("course-1", "Calculus", "user-teacher-1"),
    ("course-2", "Database Management", "user-teacher-2"),
    ("course-3", "Artificial Intelligence", "user-teacher-2"),
    ("course-4", "Data Structures", "user-teacher-3"),
    ("course-5", "Modern Physics", "user-teacher-4"),
    ("course-6", "Computer Networks", "user-teacher-5"),
];

const STUDENT_NAMES: [(&str, &str); TOTAL_STUDENTS] = [
    ("Emily", "Davis"), ("Michael", "Brown"), ("Jessica", "Miller"), ("David", "Wilson"), ("Sarah", "Moore"),
    ("James", "Taylor"), ("Laura", "Anderson"), ("Robert", "Thomas"), ("Linda", "Jackson"), ("John", "White"),
    ("Patricia", "Harris"), ("William", "Martin"), ("Elizabeth", "Thompson"), ("Richard", "Garcia"), ("Susan", "Martinez"),
    ("Joseph", "Robinson"), ("Karen", "Clark"), ("Charles", "Rodriguez"), ("Nancy", "Lewis"), ("Thomas", "Lee"),
    ("Lisa", "Walker"), ("Daniel", "Hall"), ("Betty", "Allen"), ("Paul", "Young"), ("Sandra", "Hernandez"),
    ("Mark", "King"), ("Ashley", "Wright"), ("Donald", "Lopez"), ("Kimberly", "Hill"), ("George", "Scott"),
    ("Donna", "Green"), ("Kenneth", "Adams"), ("Carol", "Baker"), ("Steven", "Gonzalez"), ("Michelle", "Nelson"),
    ("Edward", "Carter"), ("Emily", "Mitchell"), ("Brian", "Perez"), ("Sharon", "Roberts"), ("Ronald", "Turner"),
    ("Deborah", "Phillips"), ("Anthony", "Campbell"), ("Jessica", "Parker"), ("Kevin", "Evans"), ("Cynthia", "Edwards"),
    ("Jason", "Collins"), ("Kathleen", "Stewart"), ("Matthew", "Sanchez"), ("Amy", "Morris"), ("Gary", "Rogers"),
    ("Shirley", "Reed"), ("Jeffrey", "Cook"), ("Angela", "Morgan"), ("Ryan", "Bell"), ("Helen", "Murphy"),
    ("Jacob", "Bailey"), ("Anna", "Rivera"), ("Larry", "Cooper"), ("Brenda", "Richardson"), ("Frank", "Cox"),
    ("Pamela", "Howard"), ("Justin", "Ward"), ("Nicole", "Torres"), ("Brandon", "Peterson"), ("Samantha", "Gray"),
    ("Benjamin", "Ramirez"), ("Christine", "James"), ("Gregory", "Watson"), ("Rebecca", "Brooks"), ("Samuel", "Kelly"),
];

const SYLLABUSES: [(&str, &str); 6] = [
    (
        "Calculus",
        "Course: Calculus\nInstructor: Dr. Evelyn Reed\n- Weeks 1-2: Limits and continuity\n- Weeks 3-5: Derivatives\n- Weeks 6-8: Applications of differentiation\n- Weeks 9-11: Integrals\n- Weeks 12-14: Applications of integration\n- Week 15: Final exam",
    ),
    (
        "Database Management",
        "Course: Database Management\nInstructor: Emvy Stone\n- Weeks 1-3: The relational model and SQL\n- Weeks 4-6: Schema design and normalization\n- Weeks 7-9: Transactions\n- Weeks 10-12: NoSQL databases\n- Weeks 13-14: Data warehousing\n- Week 15: Final project presentations",
    ),
    (
        "Artificial Intelligence",
        "Course: Artificial Intelligence\nInstructor: Emvy Stone\n- Weeks 1-3: Search algorithms\n- Weeks 4-6: Logic and knowledge representation\n- Weeks 7-9: Machine learning fundamentals\n- Weeks 10-12: Neural networks\n- Weeks 13-14: Natural language processing\n- Week 15: Course project due",
    ),
    (
        "Data Structures",
        "Course: Data Structures\nInstructor: Mary Bloom\n- Weeks 1-3: Arrays, linked lists, stacks and queues\n- Weeks 4-6: Trees and heaps\n- Weeks 7-9: Hash tables\n- Weeks 10-12: Graphs and graph algorithms\n- Weeks 13-14: Sorting and searching\n- Week 15: Final exam",
    ),
    (
        "Modern Physics",
        "Course: Modern Physics\nInstructor: Max Sterling\n- Weeks 1-3: Special relativity\n- Weeks 4-6: Quantum mechanics basics\n- Weeks 7-9: Atomic structure\n- Weeks 10-12: Nuclear physics\n- Weeks 13-14: Particle physics\n- Week 15: Final exam",
    ),
    (
        "Computer Networks",
        "Course: Computer Networks\nInstructor: Dr. Alan Grant\n- Weeks 1-3: Physical and data link layers\n- Weeks 4-6: The network layer (IP, routing)\n- Weeks 7-9: The transport layer (TCP, UDP)\n- Weeks 10-12: The application layer (HTTP, DNS)\n- Weeks 13-14: Network security\n- Week 15: Final exam",
    ),
];

/// Every collection the store owns, as plain vectors.
#[derive(Debug, Clone, Default)]
pub struct SeedData {
    pub users: Vec<User>,
    pub courses: Vec<Course>,
    pub grades: Vec<Grade>,
    pub attendance: Vec<Attendance>,
    pub assignments: Vec<Assignment>,
    pub payments: Vec<Payment>,
    pub shared_reports: Vec<SharedReport>,
    pub timetables: Vec<Timetable>,
    pub syllabuses: HashMap<String, String>,
}

fn avatar_url(user_id: &str) -> String {
    format!("https://picsum.photos/seed/{user_id}/100/100")
}

/// A score around `base`, jittered by up to ten points and kept within 50..=100.
fn jittered_score(rng: &mut StdRng, base: i64) -> f64 {
    (base + rng.gen_range(0..21) - 10).clamp(50, 100) as f64
}

impl SeedData {
    /// Generates the full demo dataset relative to `now`.
    pub fn generate(seed: u64, now: DateTime<Utc>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let today = now.date_naive();
        let mut data = SeedData::default();

        // --- Users ---
        data.users.push(User {
            id: "user-admin-1".into(),
            name: "Jennifer Anderson".into(),
            email: "j.anderson@campify.edu".into(),
            avatar_url: avatar_url("user-admin-1"),
            profile: Profile::Admin,
        });

        for (id, name) in TEACHERS {
            let surname = name.rsplit(' ').next().unwrap_or(name).to_lowercase();
            let course_ids = COURSES
                .iter()
                .filter(|(_, _, teacher)| *teacher == id)
                .map(|(course, _, _)| course.to_string())
                .collect();
            data.users.push(User {
                id: id.into(),
                name: name.into(),
                email: format!("{surname}@campify.edu"),
                avatar_url: avatar_url(id),
                profile: Profile::Teacher { course_ids },
            });
        }

        // Every student is enrolled in every course.
        let all_course_ids: Vec<String> = COURSES.iter().map(|(id, _, _)| id.to_string()).collect();
        let mut student_ids = Vec::with_capacity(TOTAL_STUDENTS);

        for (i, (first, last)) in STUDENT_NAMES.iter().enumerate() {
            let n = i + 1;
            let student_id = format!("user-student-{n}");
            let parent_id = format!("user-parent-{n}");
            let parent_first = if n % 2 == 0 { "Mary" } else { "John" };

            data.users.push(User {
                id: student_id.clone(),
                name: format!("{first} {last}"),
                email: format!("{}.{}@campify.edu", first.to_lowercase(), last.to_lowercase()),
                avatar_url: avatar_url(&student_id),
                profile: Profile::Student {
                    parent_id: parent_id.clone(),
                    course_ids: all_course_ids.clone(),
                },
            });
            data.users.push(User {
                id: parent_id.clone(),
                name: format!("{parent_first} {last}"),
                email: format!("{}.{}@campify.edu", parent_first.to_lowercase(), last.to_lowercase()),
                avatar_url: avatar_url(&parent_id),
                profile: Profile::Parent {
                    child_ids: vec![student_id.clone()],
                },
            });
            student_ids.push(student_id);
        }

        // --- Courses ---
        data.courses = COURSES
            .iter()
            .map(|(id, name, teacher)| Course {
                id: id.to_string(),
                name: name.to_string(),
                teacher_id: teacher.to_string(),
                student_ids: student_ids.clone(),
            })
            .collect();

        data.syllabuses = SYLLABUSES
            .iter()
            .map(|(course, text)| (course.to_string(), text.to_string()))
            .collect();

        // --- Grades & Attendance ---
        let assessments: [(&str, i64, i64); 3] = [
            ("Continuous Assessment Test 1", 85, 20),
            ("Continuous Assessment Test 2", 78, 12),
            ("Mid Term Test", 92, 5),
        ];
        for student_id in &student_ids {
            let last_byte = student_id.bytes().last().unwrap_or(b'0') as i64;
            for (course_index, course_id) in all_course_ids.iter().enumerate() {
                let offset = (last_byte % 5) * (course_index as i64 + 2);
                for (k, (assignment, base, days_ago)) in assessments.iter().enumerate() {
                    // The mid-term is pushed up by the offset, the tests down.
                    let base = if k == 2 { base + offset } else { base - offset };
                    data.grades.push(Grade {
                        student_id: student_id.clone(),
                        course_id: course_id.clone(),
                        assignment: assignment.to_string(),
                        score: jittered_score(&mut rng, base),
                        total: 100.0,
                        date: today - Duration::days(*days_ago),
                    });
                }

                for i in 0..10 {
                    let status = if rng.gen::<f64>() > 0.92 {
                        AttendanceStatus::Absent
                    } else if rng.gen::<f64>() > 0.85 {
                        AttendanceStatus::Late
                    } else {
                        AttendanceStatus::Present
                    };
                    data.attendance.push(Attendance {
                        student_id: student_id.clone(),
                        course_id: course_id.clone(),
                        date: today - Duration::days(i * 3),
                        status,
                    });
                }
            }
        }

        // --- Assignments ---
        for (index, student_id) in student_ids.iter().take(20).enumerate() {
            for course_id in all_course_ids.iter().take(2) {
                let (submitted_at, due_date) = match index % 3 {
                    0 => (None, today - Duration::days(3)),
                    1 => (Some(today - Duration::days(5)), today - Duration::days(2)),
                    _ => (None, today + Duration::days(10)),
                };
                data.assignments.push(Assignment {
                    id: format!("assign-{student_id}-{course_id}-{index}"),
                    student_id: student_id.clone(),
                    course_id: course_id.clone(),
                    name: "Project Proposal".into(),
                    submitted_at,
                    due_date,
                    file_url: "#".into(),
                });
            }
        }

        // --- Payments ---
        let fee_due_date = today + Duration::days(30);
        data.payments = student_ids
            .iter()
            .enumerate()
            .map(|(i, student_id)| payment_for(i, student_id, fee_due_date))
            .collect();

        // --- Timetables ---
        for student_id in &student_ids {
            let mut slots = Vec::with_capacity(Weekday::ALL.len() * TIME_SLOTS.len());
            for day in Weekday::ALL {
                let mut shuffled = all_course_ids.clone();
                shuffled.shuffle(&mut rng);
                for (index, time) in TIME_SLOTS.into_iter().enumerate() {
                    slots.push(TimetableSlot {
                        course_id: shuffled[index % shuffled.len()].clone(),
                        day,
                        time,
                    });
                }
            }
            data.timetables.push(Timetable {
                student_id: student_id.clone(),
                slots,
            });
        }

        data.shared_reports = seed_reports(&data.users, now);
        data
    }
}

fn payment_for(index: usize, student_id: &str, due_date: NaiveDate) -> Payment {
    // user-student-2 (Michael Brown) and user-student-10 (John White) are the
    // named examples of a pending and an overdue balance.
    let (status, amount_paid) = match student_id {
        "user-student-2" => (PaymentStatus::Pending, 3000.0),
        "user-student-10" => (PaymentStatus::Overdue, 500.0),
        _ if index > 0 && index % 10 == 0 => (PaymentStatus::Overdue, 1000.0 + index as f64 * 10.0),
        _ if index > 0 && index % 5 == 0 => (PaymentStatus::Pending, 2500.0 + index as f64 * 20.0),
        _ => (PaymentStatus::Paid, FEE_AMOUNT),
    };

    Payment {
        id: format!("payment-{student_id}"),
        student_id: student_id.to_string(),
        semester: SEMESTER.into(),
        amount_due: FEE_AMOUNT,
        amount_paid,
        status,
        due_date,
    }
}

fn seed_reports(users: &[User], now: DateTime<Utc>) -> Vec<SharedReport> {
    let name_of = |id: &str| {
        users
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.name.clone())
            .unwrap_or_default()
    };
    let days_ago = |d: i64| now - Duration::days(d);
    let comment = |id: &str, report_id: &str, author: &str, content: String, d: i64| ReportComment {
        id: id.into(),
        report_id: report_id.into(),
        author_id: author.into(),
        content,
        timestamp: days_ago(d),
    };
    let emily = name_of("user-student-1");
    let laura = name_of("user-student-7");

    vec![
        SharedReport {
            id: "report-1".into(),
            student_id: "user-student-1".into(),
            teacher_id: "user-teacher-1".into(),
            course_id: "course-1".into(),
            sent_date: days_ago(2),
            report_content: format!(
                "Calculus Mid-Term Report for {emily}\n\nOverall: a solid grasp of the core concepts, a satisfactory mid-term and consistent homework.\n\nStrengths:\n- Homework is always complete.\n- Strong problem solving on the mid-term.\n\nTo improve:\n- Quiz scores sit slightly below average; review lecture notes before quizzes.\n- More questions in class would help.\n\nNext steps:\n1. Revisit the last two quizzes.\n2. Try the optional challenge problems.\n3. Come to office hours with anything unclear.\n\nDr. Evelyn Reed"
            ),
            comments: vec![comment(
                "comment-1-1",
                "report-1",
                "user-teacher-1",
                format!(
                    "Hi {}, here is the mid-term report. Let me know if you have any questions.",
                    name_of("user-parent-1")
                ),
                2,
            )],
        },
        SharedReport {
            id: "report-2".into(),
            student_id: "user-student-1".into(),
            teacher_id: "user-teacher-2".into(),
            course_id: "course-2".into(),
            sent_date: days_ago(5),
            report_content: format!(
                "Database Management - Project 1 Feedback\n\nHi {emily},\n\nGreat work on the initial schema. The normalization to 3NF is correct and the ER diagram is clear. Consider indexing the foreign key columns ahead of next week's lecture on query performance.\n\nEmvy Stone"
            ),
            comments: vec![
                comment(
                    "comment-2-1",
                    "report-2",
                    "user-teacher-2",
                    "Sharing some positive feedback on the recent project work.".into(),
                    5,
                ),
                comment(
                    "comment-2-2",
                    "report-2",
                    "user-parent-1",
                    "That's wonderful to hear! Thank you for sharing.".into(),
                    4,
                ),
            ],
        },
        SharedReport {
            id: "report-3".into(),
            student_id: "user-student-7".into(),
            teacher_id: "user-teacher-4".into(),
            course_id: "course-5".into(),
            sent_date: days_ago(3),
            report_content: format!(
                "Modern Physics - Progress Report for {laura}\n\nLab reports are detailed and insightful and class participation is strong. Some homework problems were left incomplete; starting earlier leaves time for questions.\n\nMax Sterling"
            ),
            comments: vec![comment(
                "comment-3-1",
                "report-3",
                "user-teacher-4",
                "A quick progress report. Doing very well overall!".into(),
                3,
            )],
        },
        SharedReport {
            id: "report-4".into(),
            student_id: "user-student-2".into(),
            teacher_id: "user-teacher-1".into(),
            course_id: "course-1".into(),
            sent_date: days_ago(1),
            report_content: "Calculus - Attendance Concern for Michael Brown\n\nMichael has been late for the past three classes. His test scores are still good, but regular tardiness makes it harder to keep up. Please let me know how we can help.\n\nDr. Evelyn Reed".into(),
            comments: vec![],
        },
        SharedReport {
            id: "report-5".into(),
            student_id: "user-student-7".into(),
            teacher_id: "user-teacher-1".into(),
            course_id: "course-1".into(),
            sent_date: days_ago(1),
            report_content: format!(
                "There is a pending fee for {laura}. Please check the payments page for details."
            ),
            comments: vec![],
        },
    ]
}
