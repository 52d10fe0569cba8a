use media::config::MediaSettings;
use media::{MediaError, NewPicture, PictureRepository, UrlOptions};

use crate::common::{TestMedia, dimensions, gif, png};

async fn picture_with_thumbs(app: &TestMedia, sizes: &[u32]) -> media::Picture {
    let picture = app
        .service
        .insert_picture(NewPicture::new(png(120, 60), "image/png").seo_filename("lamp"))
        .await
        .unwrap();
    for size in sizes {
        let url = app
            .service
            .picture_url(Some(&picture), UrlOptions::sized(*size))
            .await;
        assert!(!url.is_empty());
    }
    picture
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn removes_every_thumbnail_original_and_record() {
        let app = TestMedia::spawn().await;
        let picture = picture_with_thumbs(&app, &[0, 30, 60]).await;
        // Another picture's thumbnail, whose padded id shares the prefix digits.
        app.seed("images/thumbs/00000010_30.png", b"other");
        assert_eq!(app.thumb_files().len(), 4);

        app.service.delete_picture(&picture).await.unwrap();

        assert_eq!(app.thumb_files(), vec!["00000010_30.png".to_string()]);
        assert!(!app.path("images/0000001_0.png").exists());
        assert!(app.pictures.get(picture.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sweeps_shard_directories() {
        let app = TestMedia::with_settings(MediaSettings {
            multiple_thumb_directories: true,
            ..MediaSettings::default()
        })
        .await;
        let picture = picture_with_thumbs(&app, &[20, 40]).await;
        assert!(app.path("images/thumbs/000/0000001_lamp_20.png").exists());

        app.service.delete_picture(&picture).await.unwrap();

        assert!(app.thumb_files().is_empty());
    }

    #[tokio::test]
    async fn missing_blobs_do_not_block_record_deletion() {
        let app = TestMedia::spawn().await;
        let picture = picture_with_thumbs(&app, &[]).await;
        std::fs::remove_file(app.path("images/0000001_0.png")).unwrap();

        app.service.delete_picture(&picture).await.unwrap();
        assert!(app.pictures.is_empty().await);
    }
}

mod update {
    use super::*;

    #[tokio::test]
    async fn new_binary_replaces_thumbnails() {
        let app = TestMedia::spawn().await;
        let picture = picture_with_thumbs(&app, &[30]).await;

        let updated = app
            .service
            .update_picture(picture.id, NewPicture::new(gif(40, 80), "image/gif").seo_filename("lamp"))
            .await
            .unwrap();

        assert!(app.thumb_files().is_empty());
        assert!(!app.path("images/0000001_0.png").exists());
        assert!(app.path("images/0000001_0.gif").exists());

        let url = app
            .service
            .picture_url(Some(&updated), UrlOptions::sized(40))
            .await;
        assert!(url.ends_with("/images/thumbs/0000001_lamp_40.gif"));
        let thumb = std::fs::read(app.path("images/thumbs/0000001_lamp_40.gif")).unwrap();
        assert_eq!(dimensions(&thumb), (20, 40));
    }

    #[tokio::test]
    async fn unknown_picture_is_an_error() {
        let app = TestMedia::spawn().await;
        let err = app
            .service
            .update_picture(77, NewPicture::new(png(2, 2), "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::PictureNotFound(77)));
    }
}

mod seo_filename {
    use super::*;

    #[tokio::test]
    async fn renaming_sweeps_old_thumbnails() {
        let app = TestMedia::spawn().await;
        let picture = picture_with_thumbs(&app, &[30]).await;
        assert_eq!(app.thumb_files(), vec!["0000001_lamp_30.png".to_string()]);

        let renamed = app.service.set_seo_filename(picture.id, "desk-lamp").await.unwrap();
        assert!(app.thumb_files().is_empty());

        app.service
            .picture_url(Some(&renamed), UrlOptions::sized(30))
            .await;
        assert_eq!(app.thumb_files(), vec!["0000001_desk-lamp_30.png".to_string()]);
    }

    #[tokio::test]
    async fn unchanged_name_keeps_thumbnails() {
        let app = TestMedia::spawn().await;
        let picture = picture_with_thumbs(&app, &[30]).await;

        app.service.set_seo_filename(picture.id, "lamp").await.unwrap();

        assert_eq!(app.thumb_files(), vec!["0000001_lamp_30.png".to_string()]);
    }
}
