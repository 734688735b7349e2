//! Mapping between `dns_by_eye_domain::RecordType` and `hickory_proto::rr::RecordType`.

use dns_by_eye_domain::RecordType;
use hickory_proto::rr::RecordType as HickoryRecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::NS => HickoryRecordType::NS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracer_types_map_to_hickory() {
        assert_eq!(RecordTypeMapper::to_hickory(&RecordType::A), HickoryRecordType::A);
        assert_eq!(RecordTypeMapper::to_hickory(&RecordType::AAAA), HickoryRecordType::AAAA);
        assert_eq!(RecordTypeMapper::to_hickory(&RecordType::NS), HickoryRecordType::NS);
    }
}
